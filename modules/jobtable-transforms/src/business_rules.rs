//! Boolean flags and dedup-key computation. No row deletions here.

use jobtable_schema::JobRow;
use regex::Regex;
use std::sync::OnceLock;

use crate::canonical_url::canonicalize;

/// Per-flag enable switches, set by the caller's `filter_settings` input.
#[derive(Debug, Clone, Copy)]
pub struct FilterSettings {
    pub owner_op: bool,
    pub school_bus: bool,
    pub spam_filter: bool,
    pub experience_filter: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            owner_op: true,
            school_bus: true,
            spam_filter: true,
            experience_filter: true,
        }
    }
}

const OWNER_OP_PATTERNS: [&str; 6] = [
    "owner operator",
    "owner-operator",
    "lease purchase",
    "lease-purchase",
    "own truck",
    "1099 hotshot",
];

const SCHOOL_BUS_PATTERNS: [&str; 4] = [
    "school bus",
    "pupil transport",
    "student transport",
    "isd",
];

const SPAM_MARKERS: [&str; 4] = ["bit.ly", "tinyurl", "click here to win", "make money fast"];

fn experience_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\+?\s*years?\s*(?:of\s*)?experience").unwrap())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Sets `rules.*` flags and dedup keys on one row. `market` is the caller's
/// market label, already resolved (custom-location strings pass through
/// verbatim).
pub fn apply_business_rules(row: &mut JobRow, market: &str, settings: FilterSettings) {
    let combined = format!("{} {}", row.norm.title, row.norm.description).to_lowercase();

    row.rules.is_owner_op = settings.owner_op && contains_any(&combined, &OWNER_OP_PATTERNS);
    row.rules.is_school_bus = settings.school_bus && contains_any(&combined, &SCHOOL_BUS_PATTERNS);
    row.rules.is_spam_source = settings.spam_filter
        && (contains_any(&combined, &SPAM_MARKERS) || contains_any(&row.source.url.to_lowercase(), &SPAM_MARKERS));

    if settings.experience_filter {
        if let Some(caps) = experience_re().captures(&combined) {
            row.rules.has_experience_req = true;
            row.rules.experience_years_min = caps.get(1).and_then(|m| m.as_str().parse().ok());
        } else {
            row.rules.has_experience_req = false;
            row.rules.experience_years_min = None;
        }
    } else {
        row.rules.has_experience_req = false;
        row.rules.experience_years_min = None;
    }

    row.meta.market = market.to_string();

    row.rules.duplicate_r1 = format!(
        "{}|{}|{}",
        row.norm.company.to_lowercase(),
        row.norm.title.to_lowercase(),
        market
    );
    row.rules.duplicate_r2 = format!(
        "{}|{}",
        row.norm.company.to_lowercase(),
        row.norm.location.to_lowercase()
    );

    row.rules.clean_apply_url = canonicalize(&row.source.url);
}
