use async_trait::async_trait;

use crate::types::{ClassifierType, ClassifyRequest, ClassifyResult};

/// A backend that classifies one batch of postings. Implementations must
/// never panic or let a transport/parse failure escape — a failed row
/// becomes an `error` result instead, so a failed batch never aborts the
/// classification stage.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    async fn classify_batch(
        &self,
        requests: &[ClassifyRequest],
        classifier_type: ClassifierType,
    ) -> Vec<ClassifyResult>;
}
