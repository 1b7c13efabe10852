use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobtable_schema::StoreRow;

/// Filters accepted by `JobStore::search`.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub market: Option<String>,
    pub match_levels: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub route_filter: Option<String>,
    pub fair_chance_only: bool,
    pub limit: u32,
}

/// Interface over the persistent job table. Implementations are shared,
/// reentrant, and thread-safe; writes use upsert semantics keyed on
/// `job_id` so retries are idempotent.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_by_ids(&self, ids: &[String], hours_window: i64) -> anyhow::Result<Vec<StoreRow>>;
    async fn search(&self, filter: SearchFilter) -> anyhow::Result<Vec<StoreRow>>;
    async fn upsert(&self, rows: &[StoreRow]) -> anyhow::Result<()>;
    async fn refresh_timestamps(&self, ids: &[String]) -> anyhow::Result<()>;
}
