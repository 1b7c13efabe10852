use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::client::ClassifierClient;
use crate::types::{ClassifierType, ClassifyRequest, ClassifyResult};

const DEFAULT_BATCH_SIZE: usize = 25;
const DEFAULT_CONCURRENCY: usize = 10;
const BATCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Classifies every request, grouped into batches that run concurrently up
/// to `settings.concurrency`. A batch's failure is isolated by the client
/// implementation (it returns `error` results rather than propagating),
/// so one bad batch never aborts the others.
pub async fn run_classification(
    requests: Vec<ClassifyRequest>,
    client: Arc<dyn ClassifierClient>,
    classifier_type: ClassifierType,
    settings: BatchSettings,
) -> Vec<ClassifyResult> {
    if requests.is_empty() {
        return Vec::new();
    }

    let batches: Vec<Vec<ClassifyRequest>> = requests
        .chunks(settings.batch_size.max(1))
        .map(|c| c.to_vec())
        .collect();

    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut handles = Vec::with_capacity(batches.len());

    for batch in batches {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            match tokio::time::timeout(BATCH_TIMEOUT, client.classify_batch(&batch, classifier_type)).await {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!(count = batch.len(), "classifier batch timed out");
                    batch
                        .iter()
                        .map(|r| ClassifyResult::error(r.job_id.clone(), "batch timed out"))
                        .collect()
                }
            }
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(batch_results) => results.extend(batch_results),
            Err(e) => {
                tracing::error!(error = %e, "classifier batch task panicked");
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echo::EchoClassifier;

    fn request(job_id: &str, title: &str) -> ClassifyRequest {
        ClassifyRequest {
            job_id: job_id.to_string(),
            job_title: title.to_string(),
            company: "Acme".to_string(),
            location: "Dallas".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn runs_all_requests_across_batches() {
        let requests: Vec<_> = (0..60).map(|i| request(&i.to_string(), "Driver")).collect();
        let client: Arc<dyn ClassifierClient> = Arc::new(EchoClassifier);
        let settings = BatchSettings {
            batch_size: 25,
            concurrency: 4,
        };
        let results = run_classification(requests, client, ClassifierType::Cdl, settings).await;
        assert_eq!(results.len(), 60);
    }

    struct SlowClassifier;

    #[async_trait::async_trait]
    impl ClassifierClient for SlowClassifier {
        async fn classify_batch(&self, requests: &[ClassifyRequest], _classifier_type: ClassifierType) -> Vec<ClassifyResult> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            requests.iter().map(|r| ClassifyResult::error(r.job_id.clone(), "never reached")).collect()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batch_timeout_produces_error_results_for_the_whole_batch() {
        let requests = vec![request("a", "Driver"), request("b", "Driver")];
        let client: Arc<dyn ClassifierClient> = Arc::new(SlowClassifier);
        let results = run_classification(requests, client, ClassifierType::Cdl, BatchSettings::default()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.match_level == "error"));
    }

    #[tokio::test]
    async fn empty_input_returns_empty_output() {
        let client: Arc<dyn ClassifierClient> = Arc::new(EchoClassifier);
        let results = run_classification(Vec::new(), client, ClassifierType::Cdl, BatchSettings::default()).await;
        assert!(results.is_empty());
    }
}
