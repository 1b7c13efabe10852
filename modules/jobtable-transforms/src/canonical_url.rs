//! URL canonicalization used by URL dedup and `clean_apply_url`.

use url::Url;

const KEEP_PARAMS: [&str; 4] = ["jk", "jobid", "id", "job_id"];

/// Canonicalizes an apply URL for dedup purposes. Indeed view-links collapse
/// to `indeed_<jk>`; everything else keeps host+path and only the
/// job-identifying query parameters.
pub fn canonicalize(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.trim().to_string();
    };
    let host = parsed.host_str().unwrap_or_default();

    if host.contains("indeed") {
        if let Some(jk) = parsed
            .query_pairs()
            .find(|(k, _)| k == "jk")
            .map(|(_, v)| v.to_string())
        {
            return format!("indeed_{}", jk);
        }
    }

    let kept: Vec<String> = parsed
        .query_pairs()
        .filter(|(k, _)| KEEP_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    if kept.is_empty() {
        format!("{}{}", host, parsed.path())
    } else {
        format!("{}{}?{}", host, parsed.path(), kept.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indeed_view_link_collapses_to_jk() {
        let url = "https://www.indeed.com/viewjob?jk=abc123&tk=xyz";
        assert_eq!(canonicalize(url), "indeed_abc123");
    }

    #[test]
    fn non_indeed_url_keeps_host_and_path() {
        let url = "https://jobs.example.com/postings/driver-42?utm_source=feed";
        assert_eq!(canonicalize(url), "jobs.example.com/postings/driver-42");
    }

    #[test]
    fn non_indeed_url_keeps_job_id_param() {
        let url = "https://jobs.example.com/apply?job_id=99&ref=homepage";
        assert_eq!(canonicalize(url), "jobs.example.com/apply?job_id=99");
    }

    #[test]
    fn unparseable_url_returns_trimmed_input() {
        assert_eq!(canonicalize("  not a url  "), "not a url");
    }
}
