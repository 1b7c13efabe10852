//! The canonical job row: one flat record per posting, grouped into the
//! namespaces owned by each pipeline stage. Every field carries a typed
//! default so a freshly constructed row already satisfies the schema —
//! there is no way to produce a row missing a declared column.

use serde::{Deserialize, Serialize};

/// `id.*` — stable identifiers, owned by ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IdFields {
    /// Deterministic hash of normalized (company, location, title).
    pub job: String,
    /// Which provider produced this row: "indeed", "google", or "memory".
    pub source: String,
}

/// `source.*` — raw provider fields, owned by ingestion. Never mutated by
/// later stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceFields {
    pub title: String,
    pub company: String,
    pub location_raw: String,
    pub description_raw: String,
    pub url: String,
    pub posted_date: String,
    pub salary_raw: String,
}

/// `norm.*` — cleaned/derived fields, owned by normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormFields {
    pub title: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub location: String,
    pub description: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_unit: String,
    pub salary_currency: String,
    pub salary_display: String,
}

/// `rules.*` — boolean/enum flags and dedup keys, owned by business rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RulesFields {
    pub is_owner_op: bool,
    pub is_school_bus: bool,
    pub is_spam_source: bool,
    pub has_experience_req: bool,
    pub experience_years_min: Option<u32>,
    pub duplicate_r1: String,
    pub duplicate_r2: String,
    pub clean_apply_url: String,
}

/// Quality tier assigned by AI classification.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    #[default]
    #[serde(rename = "")]
    Unset,
    Good,
    #[serde(rename = "so-so")]
    SoSo,
    Bad,
    Error,
}

impl MatchLevel {
    pub fn is_exportable(&self) -> bool {
        matches!(self, MatchLevel::Good | MatchLevel::SoSo)
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, MatchLevel::Unset)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLevel::Unset => "",
            MatchLevel::Good => "good",
            MatchLevel::SoSo => "so-so",
            MatchLevel::Bad => "bad",
            MatchLevel::Error => "error",
        }
    }
}

/// Route type derived by the rule-based route classifier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RouteType {
    Local,
    Otr,
    #[default]
    Unknown,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Local => "Local",
            RouteType::Otr => "OTR",
            RouteType::Unknown => "Unknown",
        }
    }
}

/// `ai.*` — LLM outputs, owned by classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AiFields {
    pub match_level: MatchLevel,
    pub reason: String,
    pub summary: String,
    pub fair_chance: bool,
    pub endorsements: String,
    pub route_type: RouteType,
    pub career_pathway: String,
    pub training_provided: bool,
}

/// `route.*` — stage status and filtering flags, owned by routing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteFields {
    pub filtered: bool,
    pub final_status: String,
    pub ready_for_export: bool,
    pub ready_for_ai: bool,
    pub stage: String,
}

impl RouteFields {
    /// `route.ready_for_ai` defaults true; only dedup/rules flip it off.
    pub fn new_ready() -> Self {
        Self {
            ready_for_ai: true,
            ..Default::default()
        }
    }
}

/// `meta.*` — market and search context, owned by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetaFields {
    pub market: String,
    pub query: String,
    pub tracked_url: String,
}

/// `search.*` — search context, owned by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFields {
    pub location: String,
    pub mode: String,
    pub limit: u32,
    pub route_filter: String,
}

/// `agent.*` — Free-Agent personalization context, owned by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentFields {
    pub coach_username: String,
    pub candidate_id: String,
    pub candidate_name: String,
}

/// `qa.*` — validation flags/scores, owned by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QaFields {
    pub valid: bool,
    pub score: f64,
}

/// Provenance of this row's AI fields.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClassificationSource {
    FreshAi,
    SupabaseMemory,
    #[default]
    None,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationSource::FreshAi => "fresh_ai",
            ClassificationSource::SupabaseMemory => "supabase_memory",
            ClassificationSource::None => "",
        }
    }
}

/// `sys.*` — run id, timestamps, provenance, owned by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SysFields {
    pub run_id: String,
    pub is_fresh_job: bool,
    pub classification_source: ClassificationSource,
    pub created_at: String,
    pub updated_at: String,
    pub classified_at: String,
}

/// A single canonical job posting row. Every stage reads the whole row but
/// writes only to the namespace struct it owns — see spec §3.1.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobRow {
    pub id: IdFields,
    pub source: SourceFields,
    pub norm: NormFields,
    pub rules: RulesFields,
    pub ai: AiFields,
    pub route: RouteFields,
    pub meta: MetaFields,
    pub search: SearchFields,
    pub agent: AgentFields,
    pub qa: QaFields,
    pub sys: SysFields,
}

impl JobRow {
    /// A row with `route.ready_for_ai` defaulted true, as every freshly
    /// ingested row should be before business rules run.
    pub fn new() -> Self {
        Self {
            route: RouteFields::new_ready(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_row_has_typed_defaults() {
        let row = JobRow::default();
        assert_eq!(row.id.job, "");
        assert_eq!(row.ai.match_level, MatchLevel::Unset);
        assert_eq!(row.norm.salary_min, None);
        assert!(!row.rules.is_owner_op);
    }

    #[test]
    fn new_row_is_ready_for_ai() {
        let row = JobRow::new();
        assert!(row.route.ready_for_ai);
        assert!(!row.route.filtered);
    }

    #[test]
    fn match_level_exportability() {
        assert!(MatchLevel::Good.is_exportable());
        assert!(MatchLevel::SoSo.is_exportable());
        assert!(!MatchLevel::Bad.is_exportable());
        assert!(!MatchLevel::Error.is_exportable());
        assert!(!MatchLevel::Unset.is_exportable());
    }
}
