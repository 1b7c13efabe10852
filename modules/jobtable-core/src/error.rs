//! Error taxonomy for pipeline runs. Only `PipelineFatal` aborts a run;
//! every other kind degrades to a warning recorded in the result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source '{source_name}' failed: {cause}")]
    SourceFailure { source_name: String, cause: String },

    #[error("persistent store unavailable: {0}")]
    MemoryUnavailable(String),

    #[error("classification batch failed: {0}")]
    ClassificationBatchFailure(String),

    #[error("row dropped at ingestion: {0}")]
    RowValidation(String),

    #[error("unrecoverable pipeline error: {0}")]
    PipelineFatal(#[source] anyhow::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
