use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use jobtable_schema::StoreRow;

use crate::store::{JobStore, SearchFilter};

/// In-process job store for tests. Keyed by `job_id`; `classified_at` is
/// treated as an RFC3339 string for window comparisons.
#[derive(Default)]
pub struct InMemoryJobStore {
    rows: Mutex<HashMap<String, StoreRow>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, rows: Vec<StoreRow>) {
        let mut guard = self.rows.lock().unwrap();
        for row in rows {
            guard.insert(row.job_id.clone(), row);
        }
    }
}

fn within_window(classified_at: &str, hours: i64) -> bool {
    let Ok(ts) = chrono::DateTime::parse_from_rfc3339(classified_at) else {
        return false;
    };
    let cutoff = Utc::now() - chrono::Duration::hours(hours);
    ts.with_timezone(&Utc) >= cutoff
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn get_by_ids(&self, ids: &[String], hours_window: i64) -> anyhow::Result<Vec<StoreRow>> {
        let guard = self.rows.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| guard.get(id))
            .filter(|row| within_window(&row.classified_at, hours_window))
            .cloned()
            .collect())
    }

    async fn search(&self, filter: SearchFilter) -> anyhow::Result<Vec<StoreRow>> {
        let guard = self.rows.lock().unwrap();
        let match_levels: Vec<String> = if filter.match_levels.is_empty() {
            vec!["good".to_string(), "so-so".to_string()]
        } else {
            filter.match_levels
        };
        let hours = filter
            .since
            .map(|since| (Utc::now() - since).num_hours())
            .unwrap_or(96);

        let mut rows: Vec<StoreRow> = guard
            .values()
            .filter(|row| match_levels.iter().any(|m| m.eq_ignore_ascii_case(&row.match_level)))
            .filter(|row| within_window(&row.classified_at, hours))
            .filter(|row| {
                filter
                    .market
                    .as_ref()
                    .map(|m| row.market.eq_ignore_ascii_case(m))
                    .unwrap_or(true)
            })
            .filter(|row| {
                filter
                    .route_filter
                    .as_deref()
                    .map(|rf| rf.eq_ignore_ascii_case("both") || row.route_type.eq_ignore_ascii_case(rf))
                    .unwrap_or(true)
            })
            .filter(|row| !filter.fair_chance_only || row.fair_chance)
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.classified_at.cmp(&a.classified_at));
        if filter.limit > 0 {
            rows.truncate(filter.limit as usize);
        }
        Ok(rows)
    }

    async fn upsert(&self, rows: &[StoreRow]) -> anyhow::Result<()> {
        let mut guard = self.rows.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        for row in rows {
            // Mirror the Postgres store, which stamps timestamps server-side.
            let mut row = row.clone();
            if row.created_at.is_empty() {
                row.created_at = now.clone();
            }
            if row.classified_at.is_empty() {
                row.classified_at = now.clone();
            }
            row.updated_at = now.clone();
            guard.insert(row.job_id.clone(), row);
        }
        Ok(())
    }

    async fn refresh_timestamps(&self, ids: &[String]) -> anyhow::Result<()> {
        let mut guard = self.rows.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        for id in ids {
            if let Some(row) = guard.get_mut(id) {
                row.updated_at = now.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(job_id: &str, match_level: &str, market: &str) -> StoreRow {
        StoreRow {
            job_id: job_id.to_string(),
            match_level: match_level.to_string(),
            market: market.to_string(),
            classified_at: Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn search_filters_by_match_level_and_market() {
        let store = InMemoryJobStore::new();
        store.seed(vec![
            row("a", "good", "Dallas"),
            row("b", "bad", "Dallas"),
            row("c", "good", "Austin"),
        ]);
        let results = store
            .search(SearchFilter {
                market: Some("Dallas".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].job_id, "a");
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_job_id() {
        let store = InMemoryJobStore::new();
        let mut r = row("a", "good", "Dallas");
        store.upsert(&[r.clone()]).await.unwrap();
        r.match_level = "so-so".to_string();
        store.upsert(&[r]).await.unwrap();
        let results = store.get_by_ids(&["a".to_string()], 96).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_level, "so-so");
    }

    #[tokio::test]
    async fn refresh_timestamps_updates_updated_at() {
        let store = InMemoryJobStore::new();
        store.seed(vec![row("a", "good", "Dallas")]);
        store.refresh_timestamps(&["a".to_string()]).await.unwrap();
        let results = store.get_by_ids(&["a".to_string()], 96).await.unwrap();
        assert!(!results[0].updated_at.is_empty());
    }
}
