//! URL-shortening facade keyed by a target URL plus attribution tags. Must
//! never throw into the pipeline — failures degrade to the original URL.

use async_trait::async_trait;
use serde::Serialize;

/// Attribution tags attached to a shortened link.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkTags {
    pub coach: String,
    pub candidate: String,
    pub market: String,
    pub route: String,
    pub match_level: String,
    pub fair_chance: bool,
}

#[async_trait]
pub trait LinkTracker: Send + Sync {
    /// Returns the shortened URL, or `target_url` unchanged on any failure.
    async fn shorten(&self, target_url: &str, tags: &LinkTags) -> String;
}

#[derive(Serialize)]
struct ShortenRequest<'a> {
    url: &'a str,
    tags: &'a LinkTags,
}

#[derive(serde::Deserialize)]
struct ShortenResponse {
    short_url: String,
}

/// HTTP-backed tracker. Any transport, status, or parse failure is logged
/// and swallowed — the pipeline always gets a usable URL back.
pub struct HttpLinkTracker {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpLinkTracker {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LinkTracker for HttpLinkTracker {
    async fn shorten(&self, target_url: &str, tags: &LinkTags) -> String {
        let url = format!("{}/links", self.base_url);
        let result = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ShortenRequest { url: target_url, tags })
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.json::<ShortenResponse>().await {
                Ok(body) => body.short_url,
                Err(e) => {
                    tracing::warn!(error = %e, "link tracker returned unparseable response");
                    target_url.to_string()
                }
            },
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "link tracker request failed");
                target_url.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "link tracker request errored");
                target_url.to_string()
            }
        }
    }
}

/// No-op tracker for tests and memory-only searches: always returns the
/// original URL.
#[derive(Default)]
pub struct NoOpLinkTracker;

#[async_trait]
impl LinkTracker for NoOpLinkTracker {
    async fn shorten(&self, target_url: &str, _tags: &LinkTags) -> String {
        target_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_tracker_returns_original_url() {
        let tracker = NoOpLinkTracker;
        let url = tracker.shorten("https://example.com/job/1", &LinkTags::default()).await;
        assert_eq!(url, "https://example.com/job/1");
    }

    #[tokio::test]
    async fn http_tracker_degrades_to_original_on_unreachable_host() {
        let tracker = HttpLinkTracker::new("http://127.0.0.1:1", "test-key");
        let url = tracker.shorten("https://example.com/job/2", &LinkTags::default()).await;
        assert_eq!(url, "https://example.com/job/2");
    }
}
