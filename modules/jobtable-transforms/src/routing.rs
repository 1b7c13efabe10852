//! Final row-level disposition.

use jobtable_schema::{JobRow, MatchLevel, RouteType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFilter {
    Both,
    Local,
    Otr,
}

impl RouteFilter {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "local" => RouteFilter::Local,
            "otr" => RouteFilter::Otr,
            _ => RouteFilter::Both,
        }
    }
}

/// Applies the ordered routing rules to one row, setting `route.final_status`
/// and `route.ready_for_export`.
pub fn route(row: &mut JobRow, route_filter: RouteFilter) {
    if row.rules.is_owner_op {
        row.route.filtered = true;
        row.route.final_status = "filtered: owner operator".to_string();
    } else if row.rules.is_school_bus {
        row.route.filtered = true;
        row.route.final_status = "filtered: school bus".to_string();
    } else if row.rules.is_spam_source {
        row.route.filtered = true;
        row.route.final_status = "filtered: spam source".to_string();
    } else if row.ai.match_level == MatchLevel::Bad {
        row.route.filtered = true;
        row.route.final_status = "filtered: AI classified as bad".to_string();
    } else if route_filter == RouteFilter::Local && row.ai.route_type != RouteType::Local {
        row.route.filtered = true;
        row.route.final_status = "filtered: route filter".to_string();
    } else if route_filter == RouteFilter::Otr && row.ai.route_type != RouteType::Otr {
        row.route.filtered = true;
        row.route.final_status = "filtered: route filter".to_string();
    } else if matches!(row.ai.match_level, MatchLevel::Good | MatchLevel::SoSo) {
        row.route.filtered = false;
        row.route.final_status = format!("included: {} match", row.ai.match_level.as_str());
    } else {
        row.route.filtered = false;
        row.route.final_status = "passed_all_filters".to_string();
    }

    row.route.ready_for_export =
        matches!(row.ai.match_level, MatchLevel::Good | MatchLevel::SoSo) && !row.route.filtered;
}

/// Rows eligible for the classifier: unclassified, not filtered, still
/// marked ready for AI.
pub fn view_ready_for_ai(rows: &[JobRow]) -> Vec<&JobRow> {
    rows.iter()
        .filter(|r| !r.ai.match_level.is_set() && !r.route.filtered && r.route.ready_for_ai)
        .collect()
}

/// Rows ready to hand to downstream exporters.
pub fn view_exportable(rows: &[JobRow]) -> Vec<&JobRow> {
    rows.iter().filter(|r| r.route.ready_for_export).collect()
}
