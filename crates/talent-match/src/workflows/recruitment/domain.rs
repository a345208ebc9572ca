use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Engine-assigned candidate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key identifying the single application a candidate may hold for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub candidate_id: CandidateId,
    pub job_id: JobId,
}

impl PairKey {
    pub const fn new(candidate_id: CandidateId, job_id: JobId) -> Self {
        Self {
            candidate_id,
            job_id,
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate {} / job {}", self.candidate_id, self.job_id)
    }
}

/// Parsed résumé identity. Read-only once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: CandidateId,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub resume_text: String,
}

/// Candidate fields produced by intake before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub resume_text: String,
}

/// Posted job. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub title: String,
    pub description: String,
}

/// Validated title and description for a job that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
}

/// Match score held as an exact count of hundredths in `0..=10_000`.
///
/// Scores cross the API boundary as plain numbers in `[0, 100]` with two decimal places, so
/// comparing a caller's remembered score against the stored one is an integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u16);

impl Score {
    pub const MIN: Score = Score(0);
    pub const MAX: Score = Score(10_000);

    /// Round a point value to the nearest hundredth after checking it is finite and in range.
    pub fn from_points(points: f64) -> Result<Self, InvalidScore> {
        if !points.is_finite() || !(0.0..=100.0).contains(&points) {
            return Err(InvalidScore(points));
        }
        Ok(Self((points * 100.0).round() as u16))
    }

    pub const fn from_hundredths(hundredths: u16) -> Option<Self> {
        if hundredths <= Self::MAX.0 {
            Some(Self(hundredths))
        } else {
            None
        }
    }

    pub const fn hundredths(self) -> u16 {
        self.0
    }

    pub fn points(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn tier(self) -> ScoreTier {
        ScoreTier::of(self)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.points())
    }
}

impl TryFrom<f64> for Score {
    type Error = InvalidScore;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_points(value)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.points())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = f64::deserialize(deserializer)?;
        Score::from_points(points).map_err(serde::de::Error::custom)
    }
}

/// Raised for non-finite or out-of-range score values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("score {0} must be a finite number between 0 and 100")]
pub struct InvalidScore(pub f64);

/// Display band recruiters use to triage scores. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

impl ScoreTier {
    pub fn of(score: Score) -> Self {
        match score.hundredths() {
            7_000.. => ScoreTier::High,
            5_000..=6_999 => ScoreTier::Medium,
            _ => ScoreTier::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreTier::High => "high",
            ScoreTier::Medium => "medium",
            ScoreTier::Low => "low",
        }
    }
}

/// Lifecycle of an application. `Pending` is only ever the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Recruiter decision applied to an application. There is no decision leading back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Shortlist,
    Reject,
}

impl ReviewDecision {
    pub const fn target(self) -> ApplicationStatus {
        match self {
            ReviewDecision::Shortlist => ApplicationStatus::Shortlisted,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Scored relationship between one candidate and one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub score: Score,
    pub status: ApplicationStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn pending(key: PairKey, score: Score) -> Self {
        let now = Utc::now();
        Self {
            candidate_id: key.candidate_id,
            job_id: key.job_id,
            score,
            status: ApplicationStatus::Pending,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub const fn key(&self) -> PairKey {
        PairKey::new(self.candidate_id, self.job_id)
    }

    /// Apply a decision in place, returning whether the status changed.
    ///
    /// Re-applying the current status is a no-op that leaves `version` and `updated_at` alone;
    /// shortlisted and rejected may override each other.
    pub fn decide(&mut self, decision: ReviewDecision) -> bool {
        let target = decision.target();
        if self.status == target {
            return false;
        }
        self.status = target;
        self.version += 1;
        self.updated_at = Utc::now();
        true
    }
}
