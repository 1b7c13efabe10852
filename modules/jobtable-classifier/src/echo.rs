use async_trait::async_trait;

use crate::client::ClassifierClient;
use crate::types::{ClassifierType, ClassifyRequest, ClassifyResult};

/// Deterministic test double: every posting whose title contains "driver"
/// (case-insensitive) is "good", everything else is "so-so". Never touches
/// the network — used in orchestrator and pipeline tests.
#[derive(Default)]
pub struct EchoClassifier;

#[async_trait]
impl ClassifierClient for EchoClassifier {
    async fn classify_batch(
        &self,
        requests: &[ClassifyRequest],
        _classifier_type: ClassifierType,
    ) -> Vec<ClassifyResult> {
        requests
            .iter()
            .map(|r| {
                let is_driver = r.job_title.to_lowercase().contains("driver");
                ClassifyResult {
                    job_id: r.job_id.clone(),
                    match_level: if is_driver { "good" } else { "so-so" }.to_string(),
                    reason: "Echo classifier deterministic result".to_string(),
                    summary: format!("{} at {}", r.job_title, r.company),
                    fair_chance: false,
                    endorsements: String::new(),
                    career_pathway: String::new(),
                    training_provided: false,
                }
            })
            .collect()
    }
}
