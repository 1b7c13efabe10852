//! Result schema returned to downstream exporters.

use std::collections::HashMap;
use std::time::Duration;

use jobtable_memory::{BypassDecision, BypassType};
use jobtable_schema::JobRow;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CostBlock {
    pub scrape_cost: f64,
    pub scrape_cost_by_source: HashMap<String, f64>,
    pub classification_cost: f64,
    pub total_cost: f64,
    pub cost_per_quality_job: f64,
    pub memory_efficiency: f64,
}

/// The credit controller's advisory, echoed into the result so callers can
/// see why a run scraped as much (or as little) as it did.
#[derive(Debug, Clone, Serialize)]
pub struct BypassSummary {
    pub bypass_type: String,
    pub available_quality_jobs: u32,
    pub scrape_jobs_needed: u32,
    pub cost_saved: f64,
}

impl BypassSummary {
    pub fn from_decision(decision: &BypassDecision) -> Self {
        let bypass_type = match decision.bypass_type {
            BypassType::FullBypass => "FULL_BYPASS",
            BypassType::SmartCredit => "SMART_CREDIT",
            BypassType::FullScrape => "FULL_SCRAPE",
        };
        Self {
            bypass_type: bypass_type.to_string(),
            available_quality_jobs: decision.available_quality_jobs,
            scrape_jobs_needed: decision.scrape_jobs_needed,
            cost_saved: decision.cost_saved,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub run_id: String,
    pub status: String,
    pub total_jobs: usize,
    pub included_jobs: usize,
    pub quality_jobs: usize,
    pub by_match: HashMap<String, usize>,
    pub by_route: HashMap<String, usize>,
    pub by_final_status: HashMap<String, usize>,
    pub cost: CostBlock,
    pub bypass: Option<BypassSummary>,
    pub warnings: Vec<String>,
    pub processing_time_seconds: f64,
}

/// Computes the statistics block from the final frame. Costs are summed by
/// the orchestrator across every source call and classifier batch issued
/// during the run. An empty frame counts as fully memory-served: no fresh
/// row exists, so the fresh share is zero.
pub fn compute_stats(
    run_id: &str,
    status: &str,
    frame: &[JobRow],
    scrape_cost_by_source: HashMap<String, f64>,
    classification_cost: f64,
    elapsed: Duration,
) -> PipelineStats {
    let total_jobs = frame.len();
    let included_jobs = frame.iter().filter(|r| r.route.ready_for_export).count();
    let quality_jobs = frame
        .iter()
        .filter(|r| r.ai.match_level.is_exportable())
        .count();
    let memory_rows = frame.iter().filter(|r| !r.sys.is_fresh_job).count();

    let mut by_match = HashMap::new();
    let mut by_route = HashMap::new();
    let mut by_final_status = HashMap::new();
    for row in frame {
        *by_match.entry(row.ai.match_level.as_str().to_string()).or_insert(0) += 1;
        *by_route.entry(row.ai.route_type.as_str().to_string()).or_insert(0) += 1;
        *by_final_status.entry(row.route.final_status.clone()).or_insert(0) += 1;
    }

    let scrape_cost: f64 = scrape_cost_by_source.values().sum();
    let total_cost = scrape_cost + classification_cost;
    let cost_per_quality_job = if quality_jobs > 0 {
        total_cost / quality_jobs as f64
    } else {
        0.0
    };
    let memory_efficiency = if total_jobs > 0 {
        (memory_rows as f64 / total_jobs as f64) * 100.0
    } else {
        100.0
    };

    PipelineStats {
        run_id: run_id.to_string(),
        status: status.to_string(),
        total_jobs,
        included_jobs,
        quality_jobs,
        by_match,
        by_route,
        by_final_status,
        cost: CostBlock {
            scrape_cost,
            scrape_cost_by_source,
            classification_cost,
            total_cost,
            cost_per_quality_job,
            memory_efficiency,
        },
        bypass: None,
        warnings: Vec::new(),
        processing_time_seconds: elapsed.as_secs_f64(),
    }
}
