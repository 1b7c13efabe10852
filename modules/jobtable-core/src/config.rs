//! Environment-sourced secrets and endpoints. Mode/filter/strategy tunables
//! live in `PipelineConfig` since they vary per invocation, not per
//! environment.

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub apify_api_key: String,
    pub link_tracker_base_url: Option<String>,
    pub link_tracker_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")?,
            apify_api_key: std::env::var("APIFY_API_KEY")?,
            link_tracker_base_url: std::env::var("LINK_TRACKER_BASE_URL").ok(),
            link_tracker_api_key: std::env::var("LINK_TRACKER_API_KEY").ok(),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", preview(&self.database_url));
        tracing::info!("  ANTHROPIC_API_KEY: {}", preview(&self.anthropic_api_key));
        tracing::info!("  APIFY_API_KEY: {}", preview(&self.apify_api_key));
        tracing::info!("  LINK_TRACKER_BASE_URL: {}", preview_opt(&self.link_tracker_base_url));
    }
}

/// Per-mode scrape target, per §6.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Test,
    Mini,
    Sample,
    Medium,
    Large,
    Full,
}

impl Mode {
    pub fn target_count(&self) -> u32 {
        match self {
            Mode::Test => 10,
            Mode::Mini => 50,
            Mode::Sample => 100,
            Mode::Medium => 250,
            Mode::Large => 500,
            Mode::Full => 1000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Test => "test",
            Mode::Mini => "mini",
            Mode::Sample => "sample",
            Mode::Medium => "medium",
            Mode::Large => "large",
            Mode::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Balanced,
    IndeedFirst,
    GoogleFirst,
}

/// Tunables for a single pipeline invocation; see spec §6.5.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: Mode,
    pub route_filter: String,
    pub search_sources: Vec<String>,
    pub search_strategy: SearchStrategy,
    pub classifier_type: jobtable_classifier::ClassifierType,
    pub filters: jobtable_transforms::FilterSettings,
    pub dedup: jobtable_transforms::DedupSettings,
    pub force_fresh: bool,
    pub force_fresh_classification: bool,
    pub force_memory_only: bool,
    pub force_link_generation: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Sample,
            route_filter: "both".to_string(),
            search_sources: vec!["indeed".to_string(), "google".to_string()],
            search_strategy: SearchStrategy::Balanced,
            classifier_type: jobtable_classifier::ClassifierType::Cdl,
            filters: jobtable_transforms::FilterSettings::default(),
            dedup: jobtable_transforms::DedupSettings::default(),
            force_fresh: false,
            force_fresh_classification: false,
            force_memory_only: false,
            force_link_generation: false,
        }
    }
}
