use async_trait::async_trait;
use chrono::Utc;
use jobtable_schema::StoreRow;
use sqlx::PgPool;

use crate::store::{JobStore, SearchFilter};

/// Production job store backed by Postgres. Upserts key on `job_id`; a
/// single-row failure inside a batch upsert does not need special handling
/// since the statement is one round trip per call.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn get_by_ids(&self, ids: &[String], hours_window: i64) -> anyhow::Result<Vec<StoreRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cutoff = Utc::now() - chrono::Duration::hours(hours_window);
        let rows = sqlx::query_as::<_, StoreRow>(
            "SELECT job_id, job_title, company, location, job_description, apply_url,
                    indeed_job_url, google_job_url, salary,
                    match_level, match_reason, summary, fair_chance, endorsements, route_type,
                    market, search_query, classification_source, clean_apply_url, tracked_url,
                    rules_duplicate_r1, rules_duplicate_r2,
                    created_at::text, updated_at::text, classified_at::text
             FROM jobs
             WHERE job_id = ANY($1) AND classified_at >= $2",
        )
        .bind(ids)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search(&self, filter: SearchFilter) -> anyhow::Result<Vec<StoreRow>> {
        let match_levels = if filter.match_levels.is_empty() {
            vec!["good".to_string(), "so-so".to_string()]
        } else {
            filter.match_levels
        };
        let since = filter.since.unwrap_or_else(|| Utc::now() - chrono::Duration::hours(96));

        let mut query = String::from(
            "SELECT job_id, job_title, company, location, job_description, apply_url,
                    indeed_job_url, google_job_url, salary,
                    match_level, match_reason, summary, fair_chance, endorsements, route_type,
                    market, search_query, classification_source, clean_apply_url, tracked_url,
                    rules_duplicate_r1, rules_duplicate_r2,
                    created_at::text, updated_at::text, classified_at::text
             FROM jobs
             WHERE match_level = ANY($1) AND classified_at >= $2",
        );
        if filter.market.is_some() {
            query.push_str(" AND market = $3 ORDER BY classified_at DESC LIMIT $4");
        } else {
            query.push_str(" ORDER BY classified_at DESC LIMIT $3");
        }

        let limit = if filter.limit == 0 { 100 } else { filter.limit } as i64;

        let mut q = sqlx::query_as::<_, StoreRow>(&query)
            .bind(&match_levels)
            .bind(since);
        if let Some(market) = &filter.market {
            q = q.bind(market).bind(limit);
        } else {
            q = q.bind(limit);
        }

        let mut rows = q.fetch_all(&self.pool).await?;

        if let Some(route_filter) = filter.route_filter.as_deref() {
            if !route_filter.eq_ignore_ascii_case("both") {
                rows.retain(|r| r.route_type.eq_ignore_ascii_case(route_filter));
            }
        }
        if filter.fair_chance_only {
            rows.retain(|r| r.fair_chance);
        }

        Ok(rows)
    }

    async fn upsert(&self, rows: &[StoreRow]) -> anyhow::Result<()> {
        for row in rows {
            sqlx::query(
                "INSERT INTO jobs (job_id, job_title, company, location, job_description,
                                   apply_url, indeed_job_url, google_job_url, salary,
                                   match_level, match_reason, summary,
                                   fair_chance, endorsements, route_type, market, search_query,
                                   classification_source, clean_apply_url, tracked_url,
                                   rules_duplicate_r1, rules_duplicate_r2, created_at, updated_at,
                                   classified_at)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22,now(),now(),now())
                 ON CONFLICT (job_id) DO UPDATE SET
                   job_title = EXCLUDED.job_title,
                   company = EXCLUDED.company,
                   location = EXCLUDED.location,
                   job_description = EXCLUDED.job_description,
                   apply_url = EXCLUDED.apply_url,
                   indeed_job_url = EXCLUDED.indeed_job_url,
                   google_job_url = EXCLUDED.google_job_url,
                   salary = EXCLUDED.salary,
                   match_level = EXCLUDED.match_level,
                   match_reason = EXCLUDED.match_reason,
                   summary = EXCLUDED.summary,
                   fair_chance = EXCLUDED.fair_chance,
                   endorsements = EXCLUDED.endorsements,
                   route_type = EXCLUDED.route_type,
                   market = EXCLUDED.market,
                   search_query = EXCLUDED.search_query,
                   classification_source = EXCLUDED.classification_source,
                   clean_apply_url = EXCLUDED.clean_apply_url,
                   tracked_url = EXCLUDED.tracked_url,
                   rules_duplicate_r1 = EXCLUDED.rules_duplicate_r1,
                   rules_duplicate_r2 = EXCLUDED.rules_duplicate_r2,
                   updated_at = now(),
                   classified_at = EXCLUDED.classified_at",
            )
            .bind(&row.job_id)
            .bind(&row.job_title)
            .bind(&row.company)
            .bind(&row.location)
            .bind(&row.job_description)
            .bind(&row.apply_url)
            .bind(&row.indeed_job_url)
            .bind(&row.google_job_url)
            .bind(&row.salary)
            .bind(&row.match_level)
            .bind(&row.match_reason)
            .bind(&row.summary)
            .bind(row.fair_chance)
            .bind(&row.endorsements)
            .bind(&row.route_type)
            .bind(&row.market)
            .bind(&row.search_query)
            .bind(&row.classification_source)
            .bind(&row.clean_apply_url)
            .bind(&row.tracked_url)
            .bind(&row.rules_duplicate_r1)
            .bind(&row.rules_duplicate_r2)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn refresh_timestamps(&self, ids: &[String]) -> anyhow::Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE jobs SET updated_at = now() WHERE job_id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
