//! Projection between the canonical row and the persistent-store row shape.

use serde::{Deserialize, Serialize};

use crate::ids::compute_job_id;
use crate::row::JobRow;

/// The shape a `JobRow` takes on its way into and out of the persistent job
/// store. Column names mirror §6.1's indicative list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct StoreRow {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub job_description: String,
    pub apply_url: String,
    pub indeed_job_url: String,
    pub google_job_url: String,
    pub salary: String,
    pub match_level: String,
    pub match_reason: String,
    pub summary: String,
    pub fair_chance: bool,
    pub endorsements: String,
    pub route_type: String,
    pub market: String,
    pub search_query: String,
    pub classification_source: String,
    pub clean_apply_url: String,
    pub tracked_url: String,
    pub rules_duplicate_r1: String,
    pub rules_duplicate_r2: String,
    pub created_at: String,
    pub updated_at: String,
    pub classified_at: String,
}

/// Backfills `id.job`, `meta.tracked_url`, and `route.*`/`sys.*` consistency
/// on a row about to be exported or stored. Idempotent.
pub fn sanctify(mut row: JobRow) -> JobRow {
    if row.id.job.is_empty() {
        row.id.job = compute_job_id(&row.source.company, &row.source.location_raw, &row.source.title);
    }
    if row.meta.tracked_url.is_empty() {
        row.meta.tracked_url = if !row.rules.clean_apply_url.is_empty() {
            row.rules.clean_apply_url.clone()
        } else {
            row.source.url.clone()
        };
    }
    row.route.ready_for_export = row.ai.match_level.is_exportable() && !row.route.filtered;
    if row.route.final_status.is_empty() {
        row.route.final_status = if row.route.ready_for_export {
            "included".to_string()
        } else {
            "filtered:unclassified".to_string()
        };
    }
    if row.sys.classification_source.as_str().is_empty() && row.ai.match_level.is_set() {
        row.sys.classification_source = crate::row::ClassificationSource::FreshAi;
    }
    row
}

/// Projects a canonical row into its persistent-store shape. The
/// provider-specific URL columns are derived from the apply URL's host so
/// the projection stays deterministic regardless of which adapter produced
/// the row.
pub fn prepare_for_store(row: &JobRow) -> StoreRow {
    let url = row.source.url.as_str();
    let host_has = |needle: &str| {
        url.split('/')
            .nth(2)
            .map(|host| host.contains(needle))
            .unwrap_or(false)
    };
    StoreRow {
        job_id: row.id.job.clone(),
        job_title: row.norm.title.clone(),
        company: row.norm.company.clone(),
        location: row.norm.location.clone(),
        job_description: row.norm.description.clone(),
        apply_url: row.source.url.clone(),
        indeed_job_url: if host_has("indeed") { url.to_string() } else { String::new() },
        google_job_url: if host_has("google") { url.to_string() } else { String::new() },
        salary: row.norm.salary_display.clone(),
        match_level: row.ai.match_level.as_str().to_string(),
        match_reason: row.ai.reason.clone(),
        summary: row.ai.summary.clone(),
        fair_chance: row.ai.fair_chance,
        endorsements: row.ai.endorsements.clone(),
        route_type: row.ai.route_type.as_str().to_string(),
        market: row.meta.market.clone(),
        search_query: row.meta.query.clone(),
        classification_source: row.sys.classification_source.as_str().to_string(),
        clean_apply_url: row.rules.clean_apply_url.clone(),
        tracked_url: row.meta.tracked_url.clone(),
        rules_duplicate_r1: row.rules.duplicate_r1.clone(),
        rules_duplicate_r2: row.rules.duplicate_r2.clone(),
        created_at: row.sys.created_at.clone(),
        updated_at: row.sys.updated_at.clone(),
        classified_at: row.sys.classified_at.clone(),
    }
}
