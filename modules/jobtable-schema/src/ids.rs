//! Deterministic job identity.

use sha2::{Digest, Sha256};

/// Computes `id.job`: sha256 of `lower(company)|lower(location)|lower(title)`,
/// hex-encoded. Same inputs always produce the same id, regardless of source
/// or ingestion run — this is what makes cross-source dedup possible.
pub fn compute_job_id(company: &str, location: &str, title: &str) -> String {
    let key = format!(
        "{}|{}|{}",
        company.trim().to_lowercase(),
        location.trim().to_lowercase(),
        title.trim().to_lowercase()
    );
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(digest)
}
