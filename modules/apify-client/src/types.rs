use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Provider-agnostic discovery type ---

/// A normalized job posting surfaced by any scraping provider. Provider-specific
/// dataset item shapes convert into this before the ingestion adapters touch them.
#[derive(Debug, Clone)]
pub struct DiscoveredJob {
    pub title: String,
    pub company: String,
    pub location_raw: String,
    pub description_raw: String,
    pub url: String,
    pub posted_date: Option<String>,
    pub salary_raw: Option<String>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

// --- Outscraper / Indeed-like job scraper ---

/// Input for the misceres/indeed-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct IndeedScraperInput {
    pub position: String,
    pub location: String,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
    #[serde(rename = "radius", skip_serializing_if = "Option::is_none")]
    pub radius_miles: Option<u32>,
    #[serde(rename = "parseCompanyDetails")]
    pub parse_company_details: bool,
}

/// A single job posting from the Indeed-like Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct IndeedJobPosting {
    pub position: Option<String>,
    pub company: Option<String>,
    #[serde(rename = "formattedLocation")]
    pub formatted_location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "snippet")]
    pub snippet: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "postedAt")]
    pub posted_at: Option<String>,
    #[serde(rename = "salary")]
    pub salary_raw: Option<String>,
}

impl IndeedJobPosting {
    /// Convert to a provider-agnostic DiscoveredJob for the ingestion
    /// adapters. Rows missing both a title and a company carry nothing a
    /// downstream stage can key on and are dropped here.
    pub fn into_discovered(self) -> Option<DiscoveredJob> {
        let title = self.position.unwrap_or_default();
        let company = self.company.unwrap_or_default();
        if title.trim().is_empty() && company.trim().is_empty() {
            return None;
        }
        let description_raw = self
            .description
            .or(self.snippet)
            .unwrap_or_default();
        Some(DiscoveredJob {
            title,
            company,
            location_raw: self.formatted_location.unwrap_or_default(),
            description_raw,
            url: self.url.unwrap_or_default(),
            posted_date: self.posted_at,
            salary_raw: self.salary_raw,
        })
    }
}

// --- Google Jobs-like scraper ---

/// Input for the epctex/google-jobs-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleJobsScraperInput {
    pub query: String,
    pub location: String,
    #[serde(rename = "maxPagesPerQuery")]
    pub max_pages: u32,
    #[serde(rename = "noExperience", skip_serializing_if = "Option::is_none")]
    pub no_experience: Option<bool>,
}

/// A single apply link entry from a Google Jobs dataset item.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyOption {
    pub link: Option<String>,
}

/// A single job posting from the Google Jobs-like Apify dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleJobPosting {
    pub title: Option<String>,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "applyOptions", default)]
    pub apply_options: Vec<ApplyOption>,
    #[serde(rename = "applyUrls", default)]
    pub apply_urls: Vec<String>,
    #[serde(rename = "postedAt")]
    pub posted_at: Option<String>,
    #[serde(rename = "salary")]
    pub salary_raw: Option<String>,
}

impl GoogleJobPosting {
    /// Prefers the first `apply_options[].link`, then falls back to `apply_urls`.
    fn apply_url(&self) -> Option<String> {
        self.apply_options
            .iter()
            .find_map(|o| o.link.clone())
            .or_else(|| self.apply_urls.first().cloned())
    }

    /// Convert to a provider-agnostic DiscoveredJob for the ingestion
    /// adapters. Drops rows missing both a title and a company.
    pub fn into_discovered(self) -> Option<DiscoveredJob> {
        let title = self.title.clone().unwrap_or_default();
        let company = self.company_name.clone().unwrap_or_default();
        if title.trim().is_empty() && company.trim().is_empty() {
            return None;
        }
        let url = self.apply_url().unwrap_or_default();
        Some(DiscoveredJob {
            title,
            company,
            location_raw: self.location.clone().unwrap_or_default(),
            description_raw: self.description.clone().unwrap_or_default(),
            url,
            posted_date: self.posted_at.clone(),
            salary_raw: self.salary_raw.clone(),
        })
    }
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
