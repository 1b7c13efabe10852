use serde::{Deserialize, Serialize};

/// Which prompt family to use: CDL-traditional or the career-pathway variant
/// that also asks for `career_pathway`/`training_provided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierType {
    Cdl,
    Pathway,
}

/// One posting sent to the classifier.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

/// Raw per-job shape the model is asked to emit.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResult {
    pub job_id: String,
    #[serde(rename = "match")]
    pub match_level: String,
    pub reason: String,
    pub summary: String,
    #[serde(default)]
    pub fair_chance: bool,
    #[serde(default)]
    pub endorsements: String,
    #[serde(default)]
    pub career_pathway: String,
    #[serde(default)]
    pub training_provided: bool,
}

impl ClassifyResult {
    /// Builds the result recorded when a row fails classification — `job_id`
    /// is the only field known at the call site.
    pub fn error(job_id: impl Into<String>, cause: &str) -> Self {
        Self {
            job_id: job_id.into(),
            match_level: "error".to_string(),
            reason: format!("Classification failed: {}", truncate(cause, 200)),
            summary: "Job classification encountered an error".to_string(),
            fair_chance: false,
            endorsements: String::new(),
            career_pathway: String::new(),
            training_provided: false,
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
