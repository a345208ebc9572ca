mod keyword;

pub use keyword::KeywordOverlapScorer;

use async_trait::async_trait;

use super::domain::{Candidate, Job};

/// Capability that produces a raw similarity between a résumé and a job.
///
/// The engine treats the value as opaque and only validates that it is a finite number in
/// `[0, 100]`.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, candidate: &Candidate, job: &Job) -> Result<f64, ScoringError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("scorer unavailable: {0}")]
    Unavailable(String),
}
