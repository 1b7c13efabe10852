//! Ingestion adapters: convert raw provider payloads and persistent-store
//! rows into canonical `JobRow`s with only `id.*`, `source.*`, and `sys.*`
//! populated. Pure and deterministic given inputs.

pub mod scraper;

pub use scraper::{ApifyScraper, ScrapeBatch, ScraperClient};

use apify_client::{GoogleJobPosting, IndeedJobPosting};
use jobtable_schema::{JobRow, StoreRow};

/// A source of raw rows that can be turned into canonical frame rows.
/// Each adapter owns exactly one `Self::Input` shape and one `id.source` tag.
pub trait IngestAdapter {
    type Input;

    fn source_tag(&self) -> &'static str;

    fn ingest(&self, raw: Vec<Self::Input>) -> Vec<JobRow>;
}

fn base_row(source_tag: &str, title: String, company: String, location_raw: String) -> Option<JobRow> {
    if title.trim().is_empty() && company.trim().is_empty() {
        return None;
    }
    let mut row = JobRow::new();
    row.id.job = jobtable_schema::compute_job_id(&company, &location_raw, &title);
    row.id.source = source_tag.to_string();
    row.source.title = title;
    row.source.company = company;
    row.source.location_raw = location_raw;
    row.sys.is_fresh_job = true;
    Some(row)
}

/// Indeed-like scraper adapter.
pub struct OutscraperAdapter;

impl IngestAdapter for OutscraperAdapter {
    type Input = IndeedJobPosting;

    fn source_tag(&self) -> &'static str {
        "indeed"
    }

    fn ingest(&self, raw: Vec<Self::Input>) -> Vec<JobRow> {
        raw.into_iter()
            .filter_map(|posting| {
                let discovered = posting.into_discovered()?;
                let mut row = base_row(
                    self.source_tag(),
                    discovered.title,
                    discovered.company,
                    discovered.location_raw,
                )?;
                row.source.description_raw = discovered.description_raw;
                row.source.url = discovered.url;
                row.source.posted_date = discovered.posted_date.unwrap_or_default();
                row.source.salary_raw = discovered.salary_raw.unwrap_or_default();
                Some(row)
            })
            .collect()
    }
}

/// Google-Jobs-like scraper adapter.
pub struct GoogleJobsAdapter;

impl IngestAdapter for GoogleJobsAdapter {
    type Input = GoogleJobPosting;

    fn source_tag(&self) -> &'static str {
        "google"
    }

    fn ingest(&self, raw: Vec<Self::Input>) -> Vec<JobRow> {
        raw.into_iter()
            .filter_map(|posting| {
                let discovered = posting.into_discovered()?;
                let mut row = base_row(
                    self.source_tag(),
                    discovered.title,
                    discovered.company,
                    discovered.location_raw,
                )?;
                row.source.description_raw = discovered.description_raw;
                row.source.url = discovered.url;
                row.source.posted_date = discovered.posted_date.unwrap_or_default();
                row.source.salary_raw = discovered.salary_raw.unwrap_or_default();
                Some(row)
            })
            .collect()
    }
}

/// Persistent-store adapter: rows already carry AI fields, so the resulting
/// rows are marked not-fresh and skip classification.
pub struct MemoryAdapter;

impl IngestAdapter for MemoryAdapter {
    type Input = StoreRow;

    fn source_tag(&self) -> &'static str {
        "memory"
    }

    fn ingest(&self, raw: Vec<Self::Input>) -> Vec<JobRow> {
        raw.into_iter()
            .filter_map(|stored| {
                let mut row = base_row(
                    self.source_tag(),
                    stored.job_title.clone(),
                    stored.company.clone(),
                    stored.location.clone(),
                )?;
                row.id.job = stored.job_id.clone();
                row.source.description_raw = stored.job_description.clone();
                row.source.url = [&stored.apply_url, &stored.indeed_job_url, &stored.google_job_url]
                    .into_iter()
                    .find(|u| !u.is_empty())
                    .cloned()
                    .unwrap_or_default();
                row.source.salary_raw = stored.salary.clone();
                row.norm.title = stored.job_title;
                row.norm.company = stored.company;
                row.norm.location = stored.location;
                row.norm.description = stored.job_description;
                row.norm.salary_display = stored.salary;
                row.ai.match_level = parse_match_level(&stored.match_level);
                row.ai.reason = stored.match_reason;
                row.ai.summary = stored.summary;
                row.ai.fair_chance = stored.fair_chance;
                row.ai.endorsements = stored.endorsements;
                row.ai.route_type = parse_route_type(&stored.route_type);
                row.rules.duplicate_r1 = stored.rules_duplicate_r1;
                row.rules.duplicate_r2 = stored.rules_duplicate_r2;
                row.rules.clean_apply_url = stored.clean_apply_url;
                row.meta.market = stored.market;
                row.meta.query = stored.search_query;
                row.meta.tracked_url = stored.tracked_url;
                row.sys.is_fresh_job = false;
                row.sys.classification_source = jobtable_schema::ClassificationSource::SupabaseMemory;
                row.sys.created_at = stored.created_at;
                row.sys.updated_at = stored.updated_at;
                row.sys.classified_at = stored.classified_at;
                row.route.ready_for_ai = false;
                Some(row)
            })
            .collect()
    }
}

fn parse_match_level(raw: &str) -> jobtable_schema::MatchLevel {
    use jobtable_schema::MatchLevel::*;
    match raw {
        "good" => Good,
        "so-so" => SoSo,
        "bad" => Bad,
        "error" => Error,
        _ => Unset,
    }
}

fn parse_route_type(raw: &str) -> jobtable_schema::RouteType {
    use jobtable_schema::RouteType::*;
    match raw {
        "Local" => Local,
        "OTR" => Otr,
        _ => Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_indeed() -> IndeedJobPosting {
        IndeedJobPosting {
            position: Some("CDL-A Driver".into()),
            company: Some("Acme Freight".into()),
            formatted_location: Some("Dallas, TX".into()),
            description: Some("Haul freight regionally.".into()),
            snippet: None,
            url: Some("https://indeed.example/1".into()),
            posted_at: Some("2026-07-01".into()),
            salary_raw: Some("$60,000 - $70,000 a year".into()),
        }
    }

    #[test]
    fn outscraper_adapter_tags_source() {
        let rows = OutscraperAdapter.ingest(vec![sample_indeed()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.source, "indeed");
        assert!(rows[0].sys.is_fresh_job);
        assert_eq!(rows[0].id.job.len(), 64);
    }

    #[test]
    fn outscraper_adapter_drops_rows_without_title_or_company() {
        let mut empty = sample_indeed();
        empty.position = None;
        empty.company = None;
        let rows = OutscraperAdapter.ingest(vec![empty]);
        assert!(rows.is_empty());
    }

    #[test]
    fn google_adapter_prefers_apply_options_link() {
        let posting = GoogleJobPosting {
            title: Some("Dock Worker".into()),
            company_name: Some("Beta Logistics".into()),
            location: Some("Austin, TX".into()),
            description: Some("Load trailers.".into()),
            apply_options: vec![apify_client::ApplyOption {
                link: Some("https://google.example/apply".into()),
            }],
            apply_urls: vec!["https://google.example/fallback".into()],
            posted_at: None,
            salary_raw: None,
        };
        let rows = GoogleJobsAdapter.ingest(vec![posting]);
        assert_eq!(rows[0].source.url, "https://google.example/apply");
        assert_eq!(rows[0].id.source, "google");
    }

    #[test]
    fn memory_adapter_prefers_apply_url_then_provider_urls() {
        let stored = StoreRow {
            job_id: "abc".into(),
            job_title: "Driver".into(),
            company: "Acme".into(),
            indeed_job_url: "https://www.indeed.com/viewjob?jk=1".into(),
            google_job_url: "https://www.google.com/jobs/2".into(),
            ..Default::default()
        };
        let rows = MemoryAdapter.ingest(vec![stored]);
        assert_eq!(rows[0].source.url, "https://www.indeed.com/viewjob?jk=1");
    }

    #[test]
    fn store_projection_round_trips_memory_rows() {
        let stored = StoreRow {
            job_id: "abc123".into(),
            job_title: "CDL-A Driver".into(),
            company: "Acme Freight".into(),
            location: "Dallas, TX".into(),
            job_description: "Haul freight regionally.".into(),
            apply_url: "https://www.indeed.com/viewjob?jk=abc123".into(),
            indeed_job_url: "https://www.indeed.com/viewjob?jk=abc123".into(),
            salary: "$60000 / year".into(),
            match_level: "good".into(),
            match_reason: "Strong fit".into(),
            summary: "Regional freight role".into(),
            route_type: "OTR".into(),
            market: "Dallas".into(),
            search_query: "cdl driver".into(),
            classification_source: "supabase_memory".into(),
            clean_apply_url: "indeed_abc123".into(),
            tracked_url: "https://short.example/x".into(),
            rules_duplicate_r1: "acme freight|cdl-a driver|Dallas".into(),
            rules_duplicate_r2: "acme freight|dallas, tx".into(),
            ..Default::default()
        };
        let rows = MemoryAdapter.ingest(vec![stored.clone()]);
        let projected = jobtable_schema::prepare_for_store(&rows[0]);
        assert_eq!(projected, stored);
    }

    #[test]
    fn memory_adapter_marks_rows_not_fresh_and_skips_ai() {
        let stored = StoreRow {
            job_id: "abc123".into(),
            job_title: "CDL-A Driver".into(),
            company: "Acme Freight".into(),
            match_level: "good".into(),
            route_type: "OTR".into(),
            ..Default::default()
        };
        let rows = MemoryAdapter.ingest(vec![stored]);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].sys.is_fresh_job);
        assert!(!rows[0].route.ready_for_ai);
        assert_eq!(
            rows[0].sys.classification_source,
            jobtable_schema::ClassificationSource::SupabaseMemory
        );
        assert_eq!(rows[0].id.job, "abc123");
    }
}
