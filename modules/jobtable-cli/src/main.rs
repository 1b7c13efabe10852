//! Entrypoint for running a single pipeline search against live sources, or
//! a memory-only search when no scraping should happen.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobtable_classifier::ClassifierType;
use jobtable_core::{Mode, PipelineConfig, PipelineOrchestrator, PipelineRequest, SearchStrategy};
use jobtable_linktracker::{HttpLinkTracker, LinkTracker, NoOpLinkTracker};
use jobtable_memory::PgJobStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobtable", about = "Runs the multi-source job pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape, classify, dedup, and route a fresh search.
    Search {
        #[arg(long)]
        market: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "cdl driver")]
        terms: String,
        #[arg(long, value_enum, default_value = "sample")]
        mode: ModeArg,
        #[arg(long, default_value = "both")]
        route_filter: String,
        #[arg(long, value_delimiter = ',', default_value = "indeed,google")]
        sources: Vec<String>,
        #[arg(long, default_value = "balanced")]
        strategy: StrategyArg,
        #[arg(long, default_value = "cdl")]
        classifier: ClassifierArg,
        #[arg(long)]
        force_fresh: bool,
        #[arg(long)]
        force_fresh_classification: bool,
        #[arg(long)]
        force_memory_only: bool,
        #[arg(long)]
        generate_links: bool,
    },
    /// Serve a result entirely from the memory store, no scraping or classification.
    MemorySearch {
        #[arg(long)]
        market: String,
        #[arg(long)]
        route_filter: String,
        #[arg(long, value_delimiter = ',', default_value = "good,so-so")]
        match_levels: Vec<String>,
        #[arg(long)]
        fair_chance_only: bool,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum ModeArg {
    Test,
    Mini,
    Sample,
    Medium,
    Large,
    Full,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Test => Mode::Test,
            ModeArg::Mini => Mode::Mini,
            ModeArg::Sample => Mode::Sample,
            ModeArg::Medium => Mode::Medium,
            ModeArg::Large => Mode::Large,
            ModeArg::Full => Mode::Full,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum StrategyArg {
    Balanced,
    IndeedFirst,
    GoogleFirst,
}

impl From<StrategyArg> for SearchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Balanced => SearchStrategy::Balanced,
            StrategyArg::IndeedFirst => SearchStrategy::IndeedFirst,
            StrategyArg::GoogleFirst => SearchStrategy::GoogleFirst,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum ClassifierArg {
    Cdl,
    Pathway,
}

impl From<ClassifierArg> for ClassifierType {
    fn from(value: ClassifierArg) -> Self {
        match value {
            ClassifierArg::Cdl => ClassifierType::Cdl,
            ClassifierArg::Pathway => ClassifierType::Pathway,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = jobtable_core::AppConfig::from_env().context("loading configuration")?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to the job store database")?;
    let job_store = Arc::new(PgJobStore::new(pool));

    let claude = ai_client::Claude::new(config.anthropic_api_key.clone(), "claude-haiku-4-5-20251001");
    let classifier_client = Arc::new(jobtable_classifier::ClaudeClassifier::new(claude));

    let scraper = Arc::new(jobtable_sources::ApifyScraper::new(apify_client::ApifyClient::new(
        config.apify_api_key.clone(),
    )));

    let link_tracker: Arc<dyn LinkTracker> = match (&config.link_tracker_base_url, &config.link_tracker_api_key) {
        (Some(base_url), Some(api_key)) => Arc::new(HttpLinkTracker::new(base_url.clone(), api_key.clone())),
        _ => Arc::new(NoOpLinkTracker),
    };

    let orchestrator = PipelineOrchestrator::new(
        job_store,
        classifier_client,
        link_tracker,
        scraper,
        "./checkpoints",
    );

    match cli.command {
        Command::Search {
            market,
            location,
            terms,
            mode,
            route_filter,
            sources,
            strategy,
            classifier,
            force_fresh,
            force_fresh_classification,
            force_memory_only,
            generate_links,
        } => {
            let request = PipelineRequest::new(location, market, terms);
            let pipeline_config = PipelineConfig {
                mode: mode.into(),
                route_filter,
                search_sources: sources,
                search_strategy: strategy.into(),
                classifier_type: classifier.into(),
                force_fresh,
                force_fresh_classification,
                force_memory_only,
                force_link_generation: generate_links,
                ..Default::default()
            };
            let (stats, _frame) = orchestrator.run_complete_pipeline(request, pipeline_config).await?;
            tracing::info!(
                run_id = %stats.run_id,
                total = stats.total_jobs,
                included = stats.included_jobs,
                cost = stats.cost.total_cost,
                "pipeline run complete"
            );
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::MemorySearch {
            market,
            route_filter,
            match_levels,
            fair_chance_only,
            limit,
        } => {
            let request = PipelineRequest::new(market.clone(), market, String::new());
            let (stats, _frame) = orchestrator
                .run_memory_only_search(request, &route_filter, match_levels, fair_chance_only, limit)
                .await?;
            tracing::info!(run_id = %stats.run_id, total = stats.total_jobs, "memory search complete");
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
