pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    ApplyOption, DiscoveredJob, GoogleJobPosting, GoogleJobsScraperInput, IndeedJobPosting,
    IndeedScraperInput, RunData,
};
use serde::de::DeserializeOwned;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor slug for misceres/indeed-scraper.
const INDEED_SCRAPER: &str = "misceres~indeed-scraper";

/// Actor slug for epctex/google-jobs-scraper.
const GOOGLE_JOBS_SCRAPER: &str = "epctex~google-jobs-scraper";

/// Cost charged per result by the underlying Google Jobs actor, in USD.
const GOOGLE_JOBS_COST_PER_RESULT: f64 = 0.003;

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
}

/// Result of a scrape call: the raw dataset items plus the number of actor
/// queries issued and the incurred cost (nonzero only for paid actors).
pub struct ScrapeOutcome<T> {
    pub items: Vec<T>,
    pub query_count: u32,
    pub cost_usd: f64,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    async fn start_run<I: serde::Serialize>(&self, actor: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", BASE_URL, actor);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", BASE_URL, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", BASE_URL, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Scrape Indeed-like job postings end-to-end: start run, poll, fetch results.
    /// `radius_miles` and `no_experience`-style flags are passed through as-is.
    pub async fn scrape_indeed_jobs(
        &self,
        position: &str,
        location: &str,
        limit: u32,
        radius_miles: Option<u32>,
    ) -> Result<ScrapeOutcome<IndeedJobPosting>> {
        tracing::info!(position, location, limit, "Starting Indeed-like job scrape");

        let input = IndeedScraperInput {
            position: position.to_string(),
            location: location.to_string(),
            max_items: limit,
            radius_miles,
            parse_company_details: false,
        };

        let run = self.start_run(INDEED_SCRAPER, &input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items: Vec<IndeedJobPosting> =
            self.get_dataset_items(&completed.default_dataset_id).await?;
        tracing::info!(count = items.len(), "Fetched Indeed-like job postings");

        Ok(ScrapeOutcome {
            items,
            query_count: 1,
            cost_usd: 0.0,
        })
    }

    /// Scrape Google Jobs-like postings end-to-end: start run, poll, fetch results.
    /// Returns a per-result cost figure since this actor bills per scraped item.
    pub async fn scrape_google_jobs(
        &self,
        query: &str,
        location: &str,
        limit: u32,
        no_experience: Option<bool>,
    ) -> Result<ScrapeOutcome<GoogleJobPosting>> {
        tracing::info!(query, location, limit, "Starting Google Jobs-like scrape");

        let max_pages = limit.div_ceil(10).max(1);
        let input = GoogleJobsScraperInput {
            query: query.to_string(),
            location: location.to_string(),
            max_pages,
            no_experience,
        };

        let run = self.start_run(GOOGLE_JOBS_SCRAPER, &input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items: Vec<GoogleJobPosting> =
            self.get_dataset_items(&completed.default_dataset_id).await?;
        let cost_usd = items.len() as f64 * GOOGLE_JOBS_COST_PER_RESULT;
        tracing::info!(count = items.len(), cost_usd, "Fetched Google Jobs-like postings");

        Ok(ScrapeOutcome {
            items,
            query_count: max_pages,
            cost_usd,
        })
    }
}
