//! Runs pipeline stages in order, checkpoints the frame per stage, and
//! returns statistics plus the final frame.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use jobtable_classifier::{ClassifierClient, ClassifyRequest};
use jobtable_linktracker::{LinkTags, LinkTracker};
use jobtable_memory::{CreditController, JobStore, SearchFilter};
use jobtable_schema::{ClassificationSource, JobRow};
use jobtable_sources::{
    GoogleJobsAdapter, IngestAdapter, MemoryAdapter, OutscraperAdapter, ScraperClient,
};
use jobtable_transforms::{
    apply_business_rules, apply_tracked_urls, assign_market, deduplicate, derive_route_type, merge,
    normalize, route, view_exportable, view_ready_for_ai, AiUpdate, RouteFilter,
};

use crate::cancel::CancelToken;
use crate::checkpoint::CheckpointWriter;
use crate::config::{PipelineConfig, SearchStrategy};
use crate::error::{PipelineError, PipelineResult};
use crate::stats::{compute_stats, BypassSummary, PipelineStats};

const MEMORY_REUSE_WINDOW_HOURS: i64 = 720;
const MEMORY_INGEST_WINDOW_HOURS: i64 = 96;
const CLASSIFICATION_COST_PER_JOB: f64 = 0.0003;
const SOURCE_CALL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(600);

#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub coach_username: String,
    pub candidate_id: String,
    pub candidate_name: String,
}

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub location: String,
    pub market: String,
    pub search_terms: String,
    pub agent_context: AgentContext,
    pub cancel: CancelToken,
}

impl PipelineRequest {
    pub fn new(location: impl Into<String>, market: impl Into<String>, search_terms: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            market: market.into(),
            search_terms: search_terms.into(),
            agent_context: AgentContext::default(),
            cancel: CancelToken::new(),
        }
    }
}

pub struct PipelineOrchestrator {
    pub job_store: Arc<dyn JobStore>,
    pub classifier_client: Arc<dyn ClassifierClient>,
    pub link_tracker: Arc<dyn LinkTracker>,
    pub scraper: Arc<dyn ScraperClient>,
    pub checkpoints: CheckpointWriter,
}

impl PipelineOrchestrator {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        classifier_client: Arc<dyn ClassifierClient>,
        link_tracker: Arc<dyn LinkTracker>,
        scraper: Arc<dyn ScraperClient>,
        checkpoint_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self {
            job_store,
            classifier_client,
            link_tracker,
            scraper,
            checkpoints: CheckpointWriter::new(checkpoint_dir),
        }
    }

    pub async fn run_complete_pipeline(
        &self,
        request: PipelineRequest,
        config: PipelineConfig,
    ) -> PipelineResult<(PipelineStats, Vec<JobRow>)> {
        let started = Instant::now();
        let run_id = generate_run_id();
        let target = config.mode.target_count();
        let cancel = request.cancel.clone();
        let mut warnings: Vec<String> = Vec::new();

        let credit = CreditController::new(self.job_store.clone());
        let decision = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(self.cancelled_result(&run_id, started, warnings));
            }
            result = credit.decide(&request.market, target, &config.route_filter, config.force_memory_only) => {
                match result {
                    Ok(decision) => decision,
                    Err(e) => {
                        warnings.push(PipelineError::MemoryUnavailable(e.to_string()).to_string());
                        jobtable_memory::BypassDecision {
                            bypass_type: jobtable_memory::BypassType::FullScrape,
                            available_quality_jobs: 0,
                            scrape_jobs_needed: if config.force_memory_only { 0 } else { target },
                            cost_saved: 0.0,
                        }
                    }
                }
            }
        };

        tracing::info!(
            run_id = %run_id,
            bypass_type = ?decision.bypass_type,
            available = decision.available_quality_jobs,
            scrape_jobs_needed = decision.scrape_jobs_needed,
            "credit/bypass decision"
        );

        let mut scrape_cost_by_source: HashMap<String, f64> = HashMap::new();
        let mut fresh_rows = Vec::new();

        if decision.scrape_jobs_needed > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                (rows, costs, scrape_warnings) = self.scrape_fresh(&request, &config, decision.scrape_jobs_needed) => {
                    fresh_rows = rows;
                    scrape_cost_by_source = costs;
                    warnings.extend(scrape_warnings);
                }
            }
        }
        if cancel.is_cancelled() {
            return Ok(self.cancelled_result(&run_id, started, warnings));
        }

        let memory_rows = if config.force_fresh {
            Vec::new()
        } else {
            self.ingest_memory(&request, &config, &mut warnings).await
        };

        // Memory rows first, fresh rows last: exact-id dedup keeps the last
        // occurrence, so a freshly scraped duplicate wins over a stale memory row.
        let mut frame: Vec<JobRow> = memory_rows;
        frame.extend(fresh_rows);

        assign_market(&mut frame, &request.market, &request.search_terms);
        for row in frame.iter_mut() {
            row.search.location = request.location.clone();
            row.search.mode = config.mode.as_str().to_string();
            row.search.limit = target;
            row.search.route_filter = config.route_filter.clone();
            row.agent.coach_username = request.agent_context.coach_username.clone();
            row.agent.candidate_id = request.agent_context.candidate_id.clone();
            row.agent.candidate_name = request.agent_context.candidate_name.clone();
            row.qa.valid = true;
            row.sys.run_id = run_id.clone();
        }
        self.checkpoints.write(&run_id, "ingest", &frame).await;

        for row in frame.iter_mut() {
            normalize(row);
        }
        self.checkpoints.write(&run_id, "normalize", &frame).await;

        for row in frame.iter_mut() {
            apply_business_rules(row, &request.market, config.filters);
        }
        self.checkpoints.write(&run_id, "business_rules", &frame).await;

        let (mut frame, dedup_report) = deduplicate(frame, config.dedup);
        tracing::info!(
            run_id = %run_id,
            exact_id = dedup_report.exact_id_removed,
            r1 = dedup_report.r1_filtered,
            r2 = dedup_report.r2_filtered,
            url = dedup_report.url_filtered,
            "dedup complete"
        );
        self.checkpoints.write(&run_id, "dedup", &frame).await;

        if cancel.is_cancelled() {
            return Ok(self.cancelled_result(&run_id, started, warnings));
        }

        let classification_cost = tokio::select! {
            biased;
            _ = cancel.cancelled() => 0.0,
            cost = self.classify(&mut frame, &config, &mut warnings) => cost,
        };
        self.checkpoints.write(&run_id, "classification", &frame).await;
        if cancel.is_cancelled() {
            return Ok(self.cancelled_result(&run_id, started, warnings));
        }

        for row in frame.iter_mut() {
            derive_route_type(row);
        }

        let route_filter = RouteFilter::from_str(&config.route_filter);
        for row in frame.iter_mut() {
            route(row, route_filter);
        }
        self.checkpoints.write(&run_id, "routing", &frame).await;

        for row in frame.iter_mut() {
            if row.route.ready_for_export {
                row.route.final_status = if row.sys.is_fresh_job {
                    "included".to_string()
                } else {
                    "included_from_memory".to_string()
                };
                row.route.stage = "exported".to_string();
            }
        }

        self.generate_tracked_urls(&mut frame, config.force_link_generation).await;

        let persist_warnings = tokio::select! {
            biased;
            _ = cancel.cancelled() => vec!["run cancelled before persistence".to_string()],
            w = self.persist(&frame) => w,
        };
        warnings.extend(persist_warnings);
        if cancel.is_cancelled() {
            return Ok(self.cancelled_result(&run_id, started, warnings));
        }

        let elapsed = started.elapsed();
        let mut stats = compute_stats(
            &run_id,
            "completed",
            &frame,
            scrape_cost_by_source,
            classification_cost,
            elapsed,
        );
        stats.bypass = Some(BypassSummary::from_decision(&decision));
        stats.warnings = warnings;
        Ok((stats, frame))
    }

    pub async fn run_memory_only_search(
        &self,
        request: PipelineRequest,
        route_filter: &str,
        match_levels: Vec<String>,
        fair_chance_only: bool,
        limit: u32,
    ) -> PipelineResult<(PipelineStats, Vec<JobRow>)> {
        let started = Instant::now();
        let run_id = generate_run_id();

        let store_rows = self
            .job_store
            .search(SearchFilter {
                market: Some(request.market.clone()),
                match_levels,
                since: None,
                route_filter: Some(route_filter.to_string()),
                fair_chance_only,
                limit,
            })
            .await
            .map_err(PipelineError::PipelineFatal)?;

        let mut frame = MemoryAdapter.ingest(store_rows);
        assign_market(&mut frame, &request.market, &request.search_terms);
        for row in frame.iter_mut() {
            row.agent.coach_username = request.agent_context.coach_username.clone();
            row.agent.candidate_id = request.agent_context.candidate_id.clone();
            row.agent.candidate_name = request.agent_context.candidate_name.clone();
            row.qa.valid = true;
            row.sys.run_id = run_id.clone();
            row.route.ready_for_export = row.ai.match_level.is_exportable();
            row.route.final_status = if row.route.ready_for_export {
                "included_from_memory".to_string()
            } else {
                "passed_all_filters".to_string()
            };
        }

        let elapsed = started.elapsed();
        let stats = compute_stats(&run_id, "completed", &frame, HashMap::new(), 0.0, elapsed);
        Ok((stats, frame))
    }

    fn cancelled_result(
        &self,
        run_id: &str,
        started: Instant,
        mut warnings: Vec<String>,
    ) -> (PipelineStats, Vec<JobRow>) {
        tracing::warn!(run_id, "pipeline run cancelled");
        warnings.push("run cancelled".to_string());
        let mut stats = compute_stats(run_id, "error", &[], HashMap::new(), 0.0, started.elapsed());
        stats.warnings = warnings;
        (stats, Vec::new())
    }

    async fn scrape_fresh(
        &self,
        request: &PipelineRequest,
        config: &PipelineConfig,
        scrape_jobs_needed: u32,
    ) -> (Vec<JobRow>, HashMap<String, f64>, Vec<String>) {
        let sources = ordered_sources(&config.search_sources, config.search_strategy);
        if sources.is_empty() {
            return (Vec::new(), HashMap::new(), Vec::new());
        }
        let per_source_limit = scrape_jobs_needed.div_ceil(sources.len() as u32).max(1);

        let mut handles = Vec::new();
        for source in sources {
            let scraper = self.scraper.clone();
            let terms = request.search_terms.clone();
            let location = request.location.clone();
            handles.push(tokio::spawn(async move {
                match source.as_str() {
                    "indeed" => {
                        let outcome = tokio::time::timeout(
                            SOURCE_CALL_TIMEOUT,
                            scraper.fetch_indeed(&terms, &location, per_source_limit, None),
                        )
                        .await;
                        match outcome {
                            Ok(Ok(batch)) => (source, OutscraperAdapter.ingest(batch.items), batch.cost_usd, None),
                            Ok(Err(e)) => (source, Vec::new(), 0.0, Some(e.to_string())),
                            Err(_) => (source, Vec::new(), 0.0, Some("source call timed out".to_string())),
                        }
                    }
                    "google" => {
                        let outcome = tokio::time::timeout(
                            SOURCE_CALL_TIMEOUT,
                            scraper.fetch_google(&terms, &location, per_source_limit, None),
                        )
                        .await;
                        match outcome {
                            Ok(Ok(batch)) => (source, GoogleJobsAdapter.ingest(batch.items), batch.cost_usd, None),
                            Ok(Err(e)) => (source, Vec::new(), 0.0, Some(e.to_string())),
                            Err(_) => (source, Vec::new(), 0.0, Some("source call timed out".to_string())),
                        }
                    }
                    _ => (source.clone(), Vec::new(), 0.0, Some(format!("unknown search source '{source}'"))),
                }
            }));
        }

        let mut rows = Vec::new();
        let mut costs = HashMap::new();
        let mut warnings = Vec::new();
        for handle in handles {
            if let Ok((source, r, cost, failure)) = handle.await {
                if let Some(cause) = failure {
                    tracing::warn!(source = %source, cause = %cause, "scrape source failed");
                    warnings.push(PipelineError::SourceFailure { source_name: source.clone(), cause }.to_string());
                }
                rows.extend(r);
                costs.insert(source, cost);
            }
        }
        (rows, costs, warnings)
    }

    async fn ingest_memory(
        &self,
        request: &PipelineRequest,
        config: &PipelineConfig,
        warnings: &mut Vec<String>,
    ) -> Vec<JobRow> {
        let since = chrono::Utc::now() - chrono::Duration::hours(MEMORY_INGEST_WINDOW_HOURS);
        let result = self
            .job_store
            .search(SearchFilter {
                market: Some(request.market.clone()),
                match_levels: vec!["good".to_string(), "so-so".to_string()],
                since: Some(since),
                route_filter: Some(config.route_filter.clone()),
                fair_chance_only: false,
                limit: config.mode.target_count(),
            })
            .await;

        match result {
            Ok(rows) => MemoryAdapter.ingest(rows),
            Err(e) => {
                tracing::warn!(error = %e, "memory store unavailable, skipping memory ingestion");
                warnings.push(PipelineError::MemoryUnavailable(e.to_string()).to_string());
                Vec::new()
            }
        }
    }

    async fn classify(
        &self,
        frame: &mut Vec<JobRow>,
        config: &PipelineConfig,
        warnings: &mut Vec<String>,
    ) -> f64 {
        let candidate_ids: Vec<String> = view_ready_for_ai(frame)
            .into_iter()
            .map(|r| r.id.job.clone())
            .collect();
        if candidate_ids.is_empty() {
            return 0.0;
        }

        if !config.force_fresh_classification {
            match self.job_store.get_by_ids(&candidate_ids, MEMORY_REUSE_WINDOW_HOURS).await {
                Ok(hits) => {
                    let reused = hits.len();
                    let updates: HashMap<String, AiUpdate> = hits
                        .into_iter()
                        .map(|row| {
                            (
                                row.job_id.clone(),
                                AiUpdate {
                                    match_level: parse_match_level(&row.match_level),
                                    reason: row.match_reason,
                                    summary: row.summary,
                                    fair_chance: row.fair_chance,
                                    endorsements: row.endorsements,
                                    career_pathway: String::new(),
                                    training_provided: false,
                                    source: ClassificationSource::SupabaseMemory,
                                },
                            )
                        })
                        .collect();
                    merge(frame, &updates);
                    if reused > 0 {
                        tracing::info!(reused, "reused prior classifications from memory");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "memory reuse lookup failed, classifying fresh");
                    warnings.push(PipelineError::MemoryUnavailable(e.to_string()).to_string());
                }
            }
        }

        let remaining: Vec<ClassifyRequest> = view_ready_for_ai(frame)
            .into_iter()
            .map(|row| ClassifyRequest {
                job_id: row.id.job.clone(),
                job_title: row.norm.title.clone(),
                company: row.norm.company.clone(),
                location: row.norm.location.clone(),
                description: if row.norm.description.is_empty() {
                    row.source.description_raw.clone()
                } else {
                    row.norm.description.clone()
                },
            })
            .collect();

        if remaining.is_empty() {
            return 0.0;
        }

        let results = jobtable_classifier::run_classification(
            remaining,
            self.classifier_client.clone(),
            config.classifier_type,
            jobtable_classifier::BatchSettings::default(),
        )
        .await;

        let errored = results.iter().filter(|r| r.match_level == "error").count();
        if errored > 0 {
            warnings.push(
                PipelineError::ClassificationBatchFailure(format!("{errored} rows classified as error"))
                    .to_string(),
            );
        }

        let classification_cost = results.len() as f64 * CLASSIFICATION_COST_PER_JOB;
        let classified_at = chrono::Utc::now().to_rfc3339();

        let updates: HashMap<String, AiUpdate> = results
            .into_iter()
            .map(|r| {
                (
                    r.job_id.clone(),
                    AiUpdate {
                        match_level: parse_match_level(&r.match_level),
                        reason: r.reason,
                        summary: r.summary,
                        fair_chance: r.fair_chance,
                        endorsements: r.endorsements,
                        career_pathway: r.career_pathway,
                        training_provided: r.training_provided,
                        source: ClassificationSource::FreshAi,
                    },
                )
            })
            .collect();
        merge(frame, &updates);
        for row in frame.iter_mut() {
            if updates.contains_key(&row.id.job) {
                row.sys.classified_at = classified_at.clone();
            }
        }

        classification_cost
    }

    /// Shortens apply URLs for exportable rows that have none yet; `force`
    /// regenerates every exportable row's link. Best-effort: a failed call
    /// degrades to the original URL inside the tracker.
    async fn generate_tracked_urls(&self, frame: &mut Vec<JobRow>, force: bool) {
        let mut futures = Vec::new();
        for row in frame.iter() {
            if row.route.ready_for_export && (force || row.meta.tracked_url.is_empty()) {
                let tracker = self.link_tracker.clone();
                let job_id = row.id.job.clone();
                let url = row.rules.clean_apply_url.clone();
                let url = if url.is_empty() { row.source.url.clone() } else { url };
                let tags = LinkTags {
                    coach: row.agent.coach_username.clone(),
                    candidate: row.agent.candidate_id.clone(),
                    market: row.meta.market.clone(),
                    route: row.ai.route_type.as_str().to_string(),
                    match_level: row.ai.match_level.as_str().to_string(),
                    fair_chance: row.ai.fair_chance,
                };
                futures.push(async move {
                    let shortened = tracker.shorten(&url, &tags).await;
                    (job_id, shortened)
                });
            }
        }
        let resolved: HashMap<String, String> = futures::future::join_all(futures).await.into_iter().collect();
        apply_tracked_urls(frame, &resolved);
    }

    async fn persist(&self, frame: &[JobRow]) -> Vec<String> {
        let mut fresh_store_rows = Vec::new();
        let mut reused_ids = Vec::new();
        for row in view_exportable(frame) {
            if row.sys.is_fresh_job {
                let row = jobtable_schema::sanctify(row.clone());
                fresh_store_rows.push(jobtable_schema::prepare_for_store(&row));
            } else {
                reused_ids.push(row.id.job.clone());
            }
        }

        let mut warnings = Vec::new();
        if !fresh_store_rows.is_empty() {
            if let Err(e) = self.job_store.upsert(&fresh_store_rows).await {
                tracing::warn!(error = %e, "failed to upsert fresh exportable rows");
                warnings.push(PipelineError::MemoryUnavailable(format!("upsert deferred: {e}")).to_string());
            }
        }
        if !reused_ids.is_empty() {
            if let Err(e) = self.job_store.refresh_timestamps(&reused_ids).await {
                tracing::warn!(error = %e, "failed to refresh timestamps for reused rows");
                warnings.push(PipelineError::MemoryUnavailable(format!("timestamp refresh deferred: {e}")).to_string());
            }
        }
        warnings
    }
}

/// Orders enabled sources so the strategy's preferred provider is requested
/// first. All sources still run concurrently; this only biases task start
/// order.
fn ordered_sources(enabled: &[String], strategy: SearchStrategy) -> Vec<String> {
    let mut sources: Vec<String> = enabled.to_vec();
    match strategy {
        SearchStrategy::Balanced => {}
        SearchStrategy::IndeedFirst => sources.sort_by_key(|s| s.as_str() != "indeed"),
        SearchStrategy::GoogleFirst => sources.sort_by_key(|s| s.as_str() != "google"),
    }
    sources
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

fn generate_run_id() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("pipeline_{}_{}", timestamp, &suffix[..8])
}
