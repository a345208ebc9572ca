use std::fmt;
use std::time::Duration;

use super::domain::{CandidateId, InvalidScore, JobId, PairKey, Score};
use super::scoring::ScoringError;
use super::store::StoreError;

/// Record a recruitment operation referenced but could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRecord {
    Candidate(CandidateId),
    Job(JobId),
    Application(PairKey),
}

impl fmt::Display for MissingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingRecord::Candidate(id) => write!(f, "candidate {id}"),
            MissingRecord::Job(id) => write!(f, "job {id}"),
            MissingRecord::Application(key) => write!(f, "application for {key}"),
        }
    }
}

/// Failure surfaced by the matching engine, status transitions, and dashboard reads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecruitmentError {
    #[error("{0} not found")]
    NotFound(MissingRecord),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),
    #[error("score mismatch for {key}: caller supplied {supplied}, stored score is {stored}")]
    ScoreMismatch {
        key: PairKey,
        supplied: Score,
        stored: Score,
    },
    #[error("scoring timed out after {0:?}")]
    ScoringTimeout(Duration),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Store(StoreError),
}

impl RecruitmentError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<StoreError> for RecruitmentError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(key) => Self::NotFound(MissingRecord::Application(key)),
            StoreError::ScoreMismatch {
                key,
                expected,
                stored,
            } => Self::ScoreMismatch {
                key,
                supplied: expected,
                stored,
            },
            other @ StoreError::Unavailable(_) => Self::Store(other),
        }
    }
}
