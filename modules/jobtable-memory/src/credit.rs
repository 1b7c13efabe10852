//! Credit/bypass controller: decides how much fresh scraping to request
//! before the ingestion stage runs.

use std::sync::Arc;

use chrono::Utc;

use crate::store::{JobStore, SearchFilter};

const COST_PER_JOB: f64 = 0.001;
const QUALITY_RATE: f64 = 0.15;
const WINDOW_HOURS: i64 = 96;
const LARGE_SEARCH_THRESHOLD: u32 = 1000;
const LARGE_SEARCH_CAP: u32 = 100;
const SMART_CREDIT_FLOOR: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassType {
    FullBypass,
    SmartCredit,
    FullScrape,
}

/// The controller's advisory output: chosen strategy, available memory
/// count, reduced scrape target, and estimated cost saving.
#[derive(Debug, Clone)]
pub struct BypassDecision {
    pub bypass_type: BypassType,
    pub available_quality_jobs: u32,
    pub scrape_jobs_needed: u32,
    pub cost_saved: f64,
}

pub struct CreditController {
    store: Arc<dyn JobStore>,
}

impl CreditController {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Decides FULL_BYPASS / SMART_CREDIT / FULL_SCRAPE for a target count
    /// `target_jobs` in `market`, honoring `route_filter`. When
    /// `force_memory_only` is set, always returns FULL_BYPASS with whatever
    /// is available (including zero).
    pub async fn decide(
        &self,
        market: &str,
        target_jobs: u32,
        route_filter: &str,
        force_memory_only: bool,
    ) -> anyhow::Result<BypassDecision> {
        let available = self.available_quality_jobs(market, route_filter).await?;
        tracing::info!(market, target_jobs, available, force_memory_only, "credit check");

        if force_memory_only {
            return Ok(BypassDecision {
                bypass_type: BypassType::FullBypass,
                available_quality_jobs: available,
                scrape_jobs_needed: 0,
                cost_saved: target_jobs as f64 * COST_PER_JOB,
            });
        }

        let expected_quality_jobs = (target_jobs as f64 * QUALITY_RATE).floor() as u32;
        let min_bypass_jobs = if target_jobs >= LARGE_SEARCH_THRESHOLD {
            LARGE_SEARCH_CAP
        } else {
            expected_quality_jobs
        };

        let original_cost = target_jobs as f64 * COST_PER_JOB;

        if available >= min_bypass_jobs.saturating_sub(1) {
            Ok(BypassDecision {
                bypass_type: BypassType::FullBypass,
                available_quality_jobs: available,
                scrape_jobs_needed: 0,
                cost_saved: original_cost,
            })
        } else if available >= SMART_CREDIT_FLOOR {
            let quality_jobs_needed = expected_quality_jobs.saturating_sub(available);
            let scrape_jobs_needed = if quality_jobs_needed > 0 {
                ((quality_jobs_needed as f64) / QUALITY_RATE).ceil() as u32
            } else {
                0
            };
            let scrape_jobs_needed = scrape_jobs_needed.min(target_jobs);
            let reduced_cost = scrape_jobs_needed as f64 * COST_PER_JOB;
            Ok(BypassDecision {
                bypass_type: BypassType::SmartCredit,
                available_quality_jobs: available,
                scrape_jobs_needed,
                cost_saved: original_cost - reduced_cost,
            })
        } else {
            Ok(BypassDecision {
                bypass_type: BypassType::FullScrape,
                available_quality_jobs: available,
                scrape_jobs_needed: target_jobs,
                cost_saved: 0.0,
            })
        }
    }

    /// Forces FULL_BYPASS regardless of job counts, for memory-only search
    /// entry points.
    pub async fn force_full_bypass(&self, market: &str, route_filter: &str) -> anyhow::Result<BypassDecision> {
        let available = self.available_quality_jobs(market, route_filter).await?;
        Ok(BypassDecision {
            bypass_type: BypassType::FullBypass,
            available_quality_jobs: available,
            scrape_jobs_needed: 0,
            cost_saved: 0.0,
        })
    }

    async fn available_quality_jobs(&self, market: &str, route_filter: &str) -> anyhow::Result<u32> {
        let since = Utc::now() - chrono::Duration::hours(WINDOW_HOURS);
        let rows = self
            .store
            .search(SearchFilter {
                market: Some(market.to_string()),
                match_levels: vec!["good".to_string(), "so-so".to_string()],
                since: Some(since),
                route_filter: Some(route_filter.to_string()),
                fair_chance_only: false,
                limit: 100,
            })
            .await?;
        Ok(rows.len() as u32)
    }
}
