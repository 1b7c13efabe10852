use crate::types::{ClassifierType, ClassifyRequest};

pub fn system_prompt(classifier_type: ClassifierType) -> String {
    let base = "You classify truck driving job postings for quality and fit. \
Respond with a strict JSON array only, no prose, no markdown fences. \
Each element must have: job_id, match (\"good\"|\"so-so\"|\"bad\"), reason, summary, \
fair_chance (boolean), endorsements (comma-separated string, may be empty).";

    match classifier_type {
        ClassifierType::Cdl => base.to_string(),
        ClassifierType::Pathway => format!(
            "{} Additionally include career_pathway (short string) and \
training_provided (boolean) on every element.",
            base
        ),
    }
}

pub fn batch_prompt(requests: &[ClassifyRequest]) -> String {
    let jobs = requests
        .iter()
        .map(|r| {
            format!(
                "- job_id: {}\n  title: {}\n  company: {}\n  location: {}\n  description: {}",
                r.job_id, r.job_title, r.company, r.location, r.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Classify each of the following {} job postings. Return a JSON array with one \
object per job_id, in any order.\n\n{}",
        requests.len(),
        jobs
    )
}
