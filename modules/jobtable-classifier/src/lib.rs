pub mod batch;
pub mod claude;
pub mod client;
pub mod echo;
pub mod prompt;
pub mod types;

pub use batch::{run_classification, BatchSettings};
pub use claude::ClaudeClassifier;
pub use client::ClassifierClient;
pub use echo::EchoClassifier;
pub use types::{ClassifierType, ClassifyRequest, ClassifyResult};
