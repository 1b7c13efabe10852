//! End-to-end seed scenarios driven through `run_complete_pipeline`, with a
//! scripted scraper and a counting classifier standing in for the live
//! Apify and Anthropic backends.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use apify_client::{GoogleJobPosting, IndeedJobPosting};
use async_trait::async_trait;
use chrono::Utc;
use jobtable_classifier::{
    ClassifierClient, ClassifierType, ClassifyRequest, ClassifyResult, EchoClassifier,
};
use jobtable_core::{Mode, PipelineConfig, PipelineOrchestrator, PipelineRequest};
use jobtable_linktracker::NoOpLinkTracker;
use jobtable_memory::{CreditController, InMemoryJobStore};
use jobtable_schema::{compute_job_id, ClassificationSource, JobRow, StoreRow};
use jobtable_sources::{ScrapeBatch, ScraperClient};
use jobtable_transforms::{
    apply_business_rules, canonicalize, deduplicate, normalize, route, DedupSettings,
    FilterSettings, RouteFilter,
};

/// Serves fixed posting lists, truncated to the requested limit, and counts
/// how often each provider was called.
#[derive(Default)]
struct ScriptedScraper {
    indeed: Vec<IndeedJobPosting>,
    google: Vec<GoogleJobPosting>,
    indeed_calls: AtomicU32,
    google_calls: AtomicU32,
    last_indeed_limit: AtomicU32,
}

#[async_trait]
impl ScraperClient for ScriptedScraper {
    async fn fetch_indeed(
        &self,
        _terms: &str,
        _location: &str,
        limit: u32,
        _radius_miles: Option<u32>,
    ) -> anyhow::Result<ScrapeBatch<IndeedJobPosting>> {
        self.indeed_calls.fetch_add(1, Ordering::SeqCst);
        self.last_indeed_limit.store(limit, Ordering::SeqCst);
        let mut items = self.indeed.clone();
        items.truncate(limit as usize);
        Ok(ScrapeBatch { items, query_count: 1, cost_usd: 0.0 })
    }

    async fn fetch_google(
        &self,
        _terms: &str,
        _location: &str,
        limit: u32,
        _no_experience: Option<bool>,
    ) -> anyhow::Result<ScrapeBatch<GoogleJobPosting>> {
        self.google_calls.fetch_add(1, Ordering::SeqCst);
        let mut items = self.google.clone();
        items.truncate(limit as usize);
        let cost_usd = items.len() as f64 * 0.003;
        Ok(ScrapeBatch { items, query_count: 1, cost_usd })
    }
}

/// Echo classifier that also counts every row it is asked to classify, so
/// tests can assert exactly how many rows reached the LLM stage.
#[derive(Default)]
struct CountingClassifier {
    inner: EchoClassifier,
    classified: AtomicUsize,
}

#[async_trait]
impl ClassifierClient for CountingClassifier {
    async fn classify_batch(
        &self,
        requests: &[ClassifyRequest],
        classifier_type: ClassifierType,
    ) -> Vec<ClassifyResult> {
        self.classified.fetch_add(requests.len(), Ordering::SeqCst);
        self.inner.classify_batch(requests, classifier_type).await
    }
}

fn orchestrator(
    store: Arc<InMemoryJobStore>,
    classifier: Arc<CountingClassifier>,
    scraper: Arc<ScriptedScraper>,
) -> PipelineOrchestrator {
    let tracker = Arc::new(NoOpLinkTracker);
    let dir = std::env::temp_dir().join(format!("jobtable-scenarios-{}", uuid::Uuid::new_v4()));
    PipelineOrchestrator::new(store, classifier, tracker, scraper, dir)
}

fn quality_row(id: &str, market: &str, match_level: &str) -> StoreRow {
    StoreRow {
        job_id: id.to_string(),
        job_title: "CDL-A Driver".to_string(),
        company: format!("Carrier {id}"),
        location: market.to_string(),
        match_level: match_level.to_string(),
        route_type: "OTR".to_string(),
        market: market.to_string(),
        classified_at: Utc::now().to_rfc3339(),
        ..Default::default()
    }
}

fn indeed_posting(i: usize) -> IndeedJobPosting {
    IndeedJobPosting {
        position: Some(format!("CDL-A Driver {i}")),
        company: Some(format!("Fresh Carrier {i}")),
        formatted_location: Some("Oakland, CA".to_string()),
        description: Some("OTR routes across the lower 48 states, paid per mile.".to_string()),
        snippet: None,
        url: Some(format!("https://www.indeed.com/viewjob?jk=fresh{i}")),
        posted_at: Some("2026-07-30".to_string()),
        salary_raw: Some("$0.65 per mile".to_string()),
    }
}

fn google_posting(i: usize) -> GoogleJobPosting {
    GoogleJobPosting {
        title: Some(format!("Delivery Driver G{i}")),
        company_name: Some(format!("Google Carrier {i}")),
        location: Some("Oakland, CA".to_string()),
        description: Some("Home daily local delivery routes, $25 per hour.".to_string()),
        apply_options: vec![],
        apply_urls: vec![format!("https://jobs.example.com/posting/g{i}")],
        posted_at: None,
        salary_raw: Some("$25 per hour".to_string()),
    }
}

fn assert_routing_invariant(frame: &[JobRow]) {
    for row in frame {
        assert!(!row.route.final_status.is_empty(), "row {} has empty final_status", row.id.job);
        assert!(
            row.route.final_status.starts_with("included")
                || row.route.final_status.starts_with("filtered:")
                || row.route.final_status == "passed_all_filters",
            "unexpected final_status '{}'",
            row.route.final_status
        );
    }
}

/// S1 — Houston, memory-only, no hits: empty store yields a completed run
/// with an empty frame, zero cost, and a fully-memory-efficient result.
#[tokio::test]
async fn s1_memory_only_with_empty_store_completes_with_empty_frame() {
    let store = Arc::new(InMemoryJobStore::new());
    let classifier = Arc::new(CountingClassifier::default());
    let scraper = Arc::new(ScriptedScraper::default());
    let orch = orchestrator(store, classifier.clone(), scraper.clone());

    let config = PipelineConfig {
        mode: Mode::Sample,
        force_memory_only: true,
        ..Default::default()
    };
    let (stats, frame) = orch
        .run_complete_pipeline(PipelineRequest::new("Houston", "Houston", "cdl driver"), config)
        .await
        .unwrap();

    assert_eq!(stats.status, "completed");
    assert!(frame.is_empty());
    assert_eq!(stats.cost.total_cost, 0.0);
    assert_eq!(stats.cost.memory_efficiency, 100.0);
    assert_eq!(scraper.indeed_calls.load(Ordering::SeqCst), 0);
    assert_eq!(scraper.google_calls.load(Ordering::SeqCst), 0);
    assert_eq!(classifier.classified.load(Ordering::SeqCst), 0);
}

/// S2 — Dallas, FULL_BYPASS: 100 quality rows already in memory satisfy a
/// target of 100, so the run issues zero scraper calls and zero LLM calls
/// and returns only memory rows.
#[tokio::test]
async fn s2_dallas_full_bypass_serves_target_entirely_from_memory() {
    let store = Arc::new(InMemoryJobStore::new());
    let mut rows: Vec<StoreRow> = (0..40).map(|i| quality_row(&format!("good-{i}"), "Dallas", "good")).collect();
    rows.extend((0..60).map(|i| quality_row(&format!("soso-{i}"), "Dallas", "so-so")));
    store.seed(rows);

    let classifier = Arc::new(CountingClassifier::default());
    let scraper = Arc::new(ScriptedScraper::default());
    let orch = orchestrator(store, classifier.clone(), scraper.clone());

    let config = PipelineConfig {
        mode: Mode::Sample,
        ..Default::default()
    };
    let (stats, frame) = orch
        .run_complete_pipeline(PipelineRequest::new("Dallas", "Dallas", "cdl driver"), config)
        .await
        .unwrap();

    assert_eq!(frame.len(), 100);
    assert!(frame.iter().all(|r| !r.sys.is_fresh_job));
    assert_eq!(stats.cost.total_cost, 0.0);
    assert_eq!(stats.cost.memory_efficiency, 100.0);
    assert_eq!(stats.bypass.as_ref().unwrap().bypass_type, "FULL_BYPASS");
    assert_eq!(scraper.indeed_calls.load(Ordering::SeqCst), 0);
    assert_eq!(scraper.google_calls.load(Ordering::SeqCst), 0);
    assert_eq!(classifier.classified.load(Ordering::SeqCst), 0);
    assert_routing_invariant(&frame);
}

/// S3 — Bay Area, SMART_CREDIT: with 10 of the needed 15 quality jobs in
/// memory, the scrape target drops to ceil((15-10)/0.15) = 34, split across
/// both sources, and only the fresh rows reach the classifier.
#[tokio::test]
async fn s3_bay_area_smart_credit_scrapes_reduced_target() {
    let store = Arc::new(InMemoryJobStore::new());
    let rows: Vec<StoreRow> = (0..10).map(|i| quality_row(&format!("good-{i}"), "Bay Area", "good")).collect();
    store.seed(rows);

    let classifier = Arc::new(CountingClassifier::default());
    let scraper = Arc::new(ScriptedScraper {
        indeed: (0..20).map(indeed_posting).collect(),
        google: (0..20).map(google_posting).collect(),
        ..Default::default()
    });
    let orch = orchestrator(store, classifier.clone(), scraper.clone());

    let config = PipelineConfig {
        mode: Mode::Sample,
        ..Default::default()
    };
    let (stats, frame) = orch
        .run_complete_pipeline(PipelineRequest::new("Oakland, CA", "Bay Area", "cdl driver"), config)
        .await
        .unwrap();

    let bypass = stats.bypass.as_ref().unwrap();
    assert_eq!(bypass.bypass_type, "SMART_CREDIT");
    assert_eq!(bypass.scrape_jobs_needed, 34);

    // 34 split across two sources, rounded up.
    assert_eq!(scraper.indeed_calls.load(Ordering::SeqCst), 1);
    assert_eq!(scraper.google_calls.load(Ordering::SeqCst), 1);
    assert_eq!(scraper.last_indeed_limit.load(Ordering::SeqCst), 17);

    // 10 memory rows preloaded, 34 fresh rows classified.
    assert_eq!(frame.len(), 44);
    assert_eq!(classifier.classified.load(Ordering::SeqCst), 34);
    assert!((stats.cost.classification_cost - 34.0 * 0.0003).abs() < 1e-9);
    assert!((stats.cost.memory_efficiency - (10.0 / 44.0) * 100.0).abs() < 1e-9);
    assert_routing_invariant(&frame);
}

/// S3 (controller view) — the credit decision alone, without running the
/// pipeline.
#[tokio::test]
async fn s3_credit_controller_computes_reduced_scrape_target() {
    let store = Arc::new(InMemoryJobStore::new());
    let rows: Vec<StoreRow> = (0..10).map(|i| quality_row(&format!("good-{i}"), "Bay Area", "good")).collect();
    store.seed(rows);

    let controller = CreditController::new(store);
    let decision = controller.decide("Bay Area", 100, "both", false).await.unwrap();

    assert_eq!(decision.bypass_type, jobtable_memory::BypassType::SmartCredit);
    assert_eq!(decision.scrape_jobs_needed, 34);
}

/// S4 — Owner-op filter: a fresh "Owner Operator" posting is flagged and
/// excluded from export regardless of its classification.
#[tokio::test]
async fn s4_owner_operator_posting_is_filtered_from_export() {
    let mut row = JobRow::new();
    row.source.title = "Owner Operator CDL".to_string();
    row.source.company = "Acme Freight".to_string();
    row.source.location_raw = "Dallas, TX".to_string();
    row.id.job = compute_job_id(&row.source.company, &row.source.location_raw, &row.source.title);
    row.sys.is_fresh_job = true;
    row.ai.match_level = jobtable_schema::MatchLevel::Good;

    normalize(&mut row);
    apply_business_rules(&mut row, "Dallas", FilterSettings::default());
    route(&mut row, RouteFilter::Both);

    assert!(row.rules.is_owner_op);
    assert_eq!(row.route.final_status, "filtered: owner operator");
    assert!(!row.route.ready_for_export);
}

/// S5 — R1 dedup preference: a memory row and a fresh row sharing the same
/// `id.job` collapse to the fresh one, since fresh rows are appended last.
#[tokio::test]
async fn s5_exact_id_dedup_prefers_the_later_fresh_row() {
    let mut memory_row = JobRow::new();
    memory_row.id.job = "shared-id".to_string();
    memory_row.id.source = "memory".to_string();
    memory_row.sys.is_fresh_job = false;
    memory_row.ai.reason = "stale memory reason".to_string();

    let mut fresh_row = JobRow::new();
    fresh_row.id.job = "shared-id".to_string();
    fresh_row.id.source = "indeed".to_string();
    fresh_row.sys.is_fresh_job = true;
    fresh_row.ai.reason = "fresh reason".to_string();

    let (rows, report) = deduplicate(vec![memory_row, fresh_row], DedupSettings::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ai.reason, "fresh reason");
    assert_eq!(report.exact_id_removed, 1);
}

/// S6 — URL dedup across sources: an Indeed and a Google row that resolve to
/// the same canonical apply URL collapse, preferring Indeed.
#[tokio::test]
async fn s6_url_dedup_prefers_indeed_over_google() {
    let mut indeed_row = JobRow::new();
    indeed_row.id.job = "indeed-row".to_string();
    indeed_row.id.source = "indeed".to_string();
    indeed_row.source.url = "https://www.indeed.com/viewjob?jk=abc123".to_string();
    indeed_row.rules.clean_apply_url = canonicalize(&indeed_row.source.url);

    let mut google_row = JobRow::new();
    google_row.id.job = "google-row".to_string();
    google_row.id.source = "google".to_string();
    google_row.source.url = "https://www.indeed.com/viewjob?jk=abc123&from=google".to_string();
    google_row.rules.clean_apply_url = canonicalize(&google_row.source.url);

    assert_eq!(indeed_row.rules.clean_apply_url, google_row.rules.clean_apply_url);

    let (rows, _) = deduplicate(vec![google_row, indeed_row], DedupSettings::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.source, "indeed");
}

/// Memory reuse idempotence: once a run has classified and persisted a set
/// of postings, a later run that re-scrapes the same postings folds the
/// stored classifications back in and issues zero LLM calls.
#[tokio::test]
async fn reclassifying_the_same_postings_issues_zero_llm_calls() {
    let store = Arc::new(InMemoryJobStore::new());
    let classifier = Arc::new(CountingClassifier::default());
    let scraper = Arc::new(ScriptedScraper {
        indeed: (0..6).map(indeed_posting).collect(),
        ..Default::default()
    });
    let orch = orchestrator(store, classifier.clone(), scraper.clone());

    let config = PipelineConfig {
        mode: Mode::Sample,
        search_sources: vec!["indeed".to_string()],
        ..Default::default()
    };
    let request = || PipelineRequest::new("Oakland, CA", "Bay Area", "cdl driver");

    let (_, frame) = orch.run_complete_pipeline(request(), config.clone()).await.unwrap();
    let first_run_calls = classifier.classified.load(Ordering::SeqCst);
    assert_eq!(first_run_calls, 6);
    let first_matches: Vec<_> = frame.iter().map(|r| (r.id.job.clone(), r.ai.match_level)).collect();

    // The second run filters to local-only, so the stored OTR rows don't
    // trigger a bypass and the same postings are scraped again.
    let second_config = PipelineConfig {
        route_filter: "local".to_string(),
        ..config
    };
    let (stats, frame) = orch.run_complete_pipeline(request(), second_config).await.unwrap();

    assert_eq!(classifier.classified.load(Ordering::SeqCst), first_run_calls);
    for row in frame.iter().filter(|r| r.sys.is_fresh_job) {
        assert_eq!(row.sys.classification_source, ClassificationSource::SupabaseMemory);
        let first = first_matches.iter().find(|(id, _)| *id == row.id.job).unwrap();
        assert_eq!(row.ai.match_level, first.1);
    }
    assert_eq!(stats.cost.classification_cost, 0.0);
}
