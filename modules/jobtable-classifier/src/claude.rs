use std::time::Duration;

use ai_client::Claude;
use async_trait::async_trait;
use rand::Rng;

use crate::client::ClassifierClient;
use crate::prompt::{batch_prompt, system_prompt};
use crate::types::{ClassifierType, ClassifyRequest, ClassifyResult};

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(2);

/// Classifier backed by the Anthropic Messages API. Retries a batch up to
/// `MAX_ATTEMPTS` times with exponential backoff plus jitter before giving
/// up and marking every row in the batch as errored.
pub struct ClaudeClassifier {
    claude: Claude,
}

impl ClaudeClassifier {
    pub fn new(claude: Claude) -> Self {
        Self { claude }
    }

    async fn call_once(&self, requests: &[ClassifyRequest], classifier_type: ClassifierType) -> anyhow::Result<Vec<ClassifyResult>> {
        let system = system_prompt(classifier_type);
        let user = batch_prompt(requests);
        let response = self.claude.chat_completion(system, user).await?;
        let cleaned = ai_client::util::strip_code_blocks(&response);
        let results: Vec<ClassifyResult> = serde_json::from_str(cleaned)?;
        Ok(results)
    }
}

#[async_trait]
impl ClassifierClient for ClaudeClassifier {
    async fn classify_batch(
        &self,
        requests: &[ClassifyRequest],
        classifier_type: ClassifierType,
    ) -> Vec<ClassifyResult> {
        let mut last_err = String::new();

        for attempt in 0..MAX_ATTEMPTS {
            match self.call_once(requests, classifier_type).await {
                Ok(results) => return reconcile(requests, results),
                Err(e) => {
                    last_err = e.to_string();
                    if attempt + 1 < MAX_ATTEMPTS {
                        let backoff = BASE_BACKOFF * 2u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..500));
                        tracing::warn!(
                            attempt = attempt + 1,
                            error = %last_err,
                            "classifier batch failed, retrying after backoff"
                        );
                        tokio::time::sleep(backoff + jitter).await;
                    }
                }
            }
        }

        tracing::error!(error = %last_err, count = requests.len(), "classifier batch exhausted retries");
        requests
            .iter()
            .map(|r| ClassifyResult::error(r.job_id.clone(), &last_err))
            .collect()
    }
}

/// Fills in `error` results for any job_id the model's JSON response omitted,
/// so every requested row always gets exactly one result back.
fn reconcile(requests: &[ClassifyRequest], mut results: Vec<ClassifyResult>) -> Vec<ClassifyResult> {
    let returned: std::collections::HashSet<String> =
        results.iter().map(|r| r.job_id.clone()).collect();
    for req in requests {
        if !returned.contains(&req.job_id) {
            results.push(ClassifyResult::error(req.job_id.clone(), "missing from model response"));
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_fills_missing_job_ids() {
        let requests = vec![
            ClassifyRequest {
                job_id: "a".into(),
                job_title: "Driver".into(),
                company: "Acme".into(),
                location: "Dallas".into(),
                description: "".into(),
            },
            ClassifyRequest {
                job_id: "b".into(),
                job_title: "Driver".into(),
                company: "Beta".into(),
                location: "Austin".into(),
                description: "".into(),
            },
        ];
        let partial = vec![ClassifyResult {
            job_id: "a".into(),
            match_level: "good".into(),
            reason: "Strong fit".into(),
            summary: "Good match".into(),
            fair_chance: false,
            endorsements: String::new(),
            career_pathway: String::new(),
            training_provided: false,
        }];
        let reconciled = reconcile(&requests, partial);
        assert_eq!(reconciled.len(), 2);
        assert!(reconciled.iter().any(|r| r.job_id == "b" && r.match_level == "error"));
    }
}
