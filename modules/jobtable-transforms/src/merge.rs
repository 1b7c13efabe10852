//! `merge`, `assign_market`, `apply_tracked_urls` — small orchestrator-facing
//! helpers that stitch classifier/memory/link-tracker results back into the
//! frame.

use std::collections::HashMap;

use jobtable_schema::{ClassificationSource, JobRow, MatchLevel, RouteType};

/// AI fields produced by either the classifier or a memory-store hit, keyed
/// by `id.job` for folding back into the frame.
#[derive(Debug, Clone, Default)]
pub struct AiUpdate {
    pub match_level: MatchLevel,
    pub reason: String,
    pub summary: String,
    pub fair_chance: bool,
    pub endorsements: String,
    pub career_pathway: String,
    pub training_provided: bool,
    pub source: ClassificationSource,
}

/// Folds classifier/memory results into matching rows by `id.job`. Rows with
/// no corresponding update are left untouched — the classifier must never
/// modify rows it did not process in a given call.
pub fn merge(rows: &mut [JobRow], updates: &HashMap<String, AiUpdate>) {
    for row in rows.iter_mut() {
        if let Some(update) = updates.get(&row.id.job) {
            row.ai.match_level = update.match_level;
            row.ai.reason = update.reason.clone();
            row.ai.summary = update.summary.clone();
            row.ai.fair_chance = update.fair_chance;
            row.ai.endorsements = update.endorsements.clone();
            row.ai.career_pathway = update.career_pathway.clone();
            row.ai.training_provided = update.training_provided;
            row.sys.classification_source = update.source;
        }
    }
}

/// Stamps every row in the frame with the caller-supplied market label and
/// search query. A custom-location string from the caller is carried
/// through verbatim.
pub fn assign_market(rows: &mut [JobRow], market: &str, query: &str) {
    for row in rows.iter_mut() {
        row.meta.market = market.to_string();
        row.meta.query = query.to_string();
    }
}

/// Applies tracked URLs produced by the link-tracker facade to rows about to
/// be exported, keyed by `id.job`. Rows with no entry keep their existing
/// `meta.tracked_url` (falling back to the apply URL happens in `sanctify`).
pub fn apply_tracked_urls(rows: &mut [JobRow], tracked: &HashMap<String, String>) {
    for row in rows.iter_mut() {
        if let Some(url) = tracked.get(&row.id.job) {
            row.meta.tracked_url = url.clone();
        }
    }
}

/// Route derivation helper used when folding route-type alone needs no full
/// `RouteType::Unknown` default; kept distinct from `merge` since route type
/// is rule-derived, not classifier-derived.
pub fn set_route_type(rows: &mut [JobRow], route_types: &HashMap<String, RouteType>) {
    for row in rows.iter_mut() {
        if let Some(&route_type) = route_types.get(&row.id.job) {
            row.ai.route_type = route_type;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_touches_matched_rows() {
        let mut untouched = JobRow::new();
        untouched.id.job = "keep-as-is".to_string();
        let mut target = JobRow::new();
        target.id.job = "target".to_string();

        let mut updates = HashMap::new();
        updates.insert(
            "target".to_string(),
            AiUpdate {
                match_level: MatchLevel::Good,
                reason: "Strong fit".to_string(),
                source: ClassificationSource::FreshAi,
                ..Default::default()
            },
        );

        let mut rows = vec![untouched, target];
        merge(&mut rows, &updates);

        assert_eq!(rows[0].ai.match_level, MatchLevel::Unset);
        assert_eq!(rows[1].ai.match_level, MatchLevel::Good);
        assert_eq!(rows[1].sys.classification_source, ClassificationSource::FreshAi);
    }

    #[test]
    fn assign_market_stamps_every_row() {
        let mut rows = vec![JobRow::new(), JobRow::new()];
        assign_market(&mut rows, "Dallas-Fort Worth", "cdl driver");
        assert!(rows.iter().all(|r| r.meta.market == "Dallas-Fort Worth"));
        assert!(rows.iter().all(|r| r.meta.query == "cdl driver"));
    }

    #[test]
    fn apply_tracked_urls_leaves_unmatched_rows_alone() {
        let mut row = JobRow::new();
        row.id.job = "a".to_string();
        row.meta.tracked_url = "https://original.example/a".to_string();
        let mut rows = vec![row];
        apply_tracked_urls(&mut rows, &HashMap::new());
        assert_eq!(rows[0].meta.tracked_url, "https://original.example/a");
    }
}
