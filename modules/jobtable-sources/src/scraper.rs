//! Scraper facade: one "fetch N postings for (terms, location)" call per
//! provider, returning the raw dataset items plus a cost figure and query
//! count. The pipeline only ever talks to this trait; the Apify-backed
//! implementation lives here, scripted fakes live with the tests that use
//! them.

use apify_client::{ApifyClient, GoogleJobPosting, IndeedJobPosting};
use async_trait::async_trait;

/// One provider call's worth of raw postings.
pub struct ScrapeBatch<T> {
    pub items: Vec<T>,
    pub query_count: u32,
    pub cost_usd: f64,
}

#[async_trait]
pub trait ScraperClient: Send + Sync {
    async fn fetch_indeed(
        &self,
        terms: &str,
        location: &str,
        limit: u32,
        radius_miles: Option<u32>,
    ) -> anyhow::Result<ScrapeBatch<IndeedJobPosting>>;

    async fn fetch_google(
        &self,
        terms: &str,
        location: &str,
        limit: u32,
        no_experience: Option<bool>,
    ) -> anyhow::Result<ScrapeBatch<GoogleJobPosting>>;
}

/// Production scraper backed by the Apify actors.
pub struct ApifyScraper {
    client: ApifyClient,
}

impl ApifyScraper {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScraperClient for ApifyScraper {
    async fn fetch_indeed(
        &self,
        terms: &str,
        location: &str,
        limit: u32,
        radius_miles: Option<u32>,
    ) -> anyhow::Result<ScrapeBatch<IndeedJobPosting>> {
        let outcome = self
            .client
            .scrape_indeed_jobs(terms, location, limit, radius_miles)
            .await?;
        Ok(ScrapeBatch {
            items: outcome.items,
            query_count: outcome.query_count,
            cost_usd: outcome.cost_usd,
        })
    }

    async fn fetch_google(
        &self,
        terms: &str,
        location: &str,
        limit: u32,
        no_experience: Option<bool>,
    ) -> anyhow::Result<ScrapeBatch<GoogleJobPosting>> {
        let outcome = self
            .client
            .scrape_google_jobs(terms, location, limit, no_experience)
            .await?;
        Ok(ScrapeBatch {
            items: outcome.items,
            query_count: outcome.query_count,
            cost_usd: outcome.cost_usd,
        })
    }
}
