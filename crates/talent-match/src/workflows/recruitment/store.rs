use super::domain::{
    Application, ApplicationStatus, Candidate, CandidateDraft, CandidateId, Job, JobId,
    JobPosting, PairKey, ReviewDecision, Score,
};

/// System of record for applications.
///
/// Implementations own every application and expose only atomic primitives: an insert that
/// never overwrites, and a compare-and-update keyed on the pair. Readers only ever receive
/// fully constructed clones.
pub trait ScoreStore: Send + Sync {
    /// Store `application` unless one already exists for its pair.
    fn insert_if_absent(&self, application: Application) -> Result<Insertion, StoreError>;

    fn fetch(&self, key: PairKey) -> Result<Option<Application>, StoreError>;

    /// Apply `decision` if the stored score equals `expected`, in one step under the pair's lock.
    fn apply_decision(
        &self,
        key: PairKey,
        expected: Score,
        decision: ReviewDecision,
    ) -> Result<StatusChange, StoreError>;

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError>;
}

/// Registry of candidates and jobs referenced by applications.
pub trait Roster: Send + Sync {
    fn add_candidate(&self, draft: CandidateDraft) -> Result<Candidate, StoreError>;
    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError>;
    fn candidates(&self) -> Result<Vec<Candidate>, StoreError>;
    fn add_job(&self, posting: JobPosting) -> Result<Job, StoreError>;
    fn job(&self, id: JobId) -> Result<Option<Job>, StoreError>;
    fn jobs(&self) -> Result<Vec<Job>, StoreError>;
}

/// Everything the recruitment service needs from storage.
pub trait RecruitmentStore: ScoreStore + Roster {}

impl<T: ScoreStore + Roster> RecruitmentStore for T {}

/// Result of an insert-if-absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    Inserted(Application),
    Existing(Application),
}

impl Insertion {
    pub fn application(&self) -> &Application {
        match self {
            Insertion::Inserted(application) | Insertion::Existing(application) => application,
        }
    }

    pub fn into_application(self) -> Application {
        match self {
            Insertion::Inserted(application) | Insertion::Existing(application) => application,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, Insertion::Inserted(_))
    }
}

/// Committed status update together with the status it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub application: Application,
    pub previous: ApplicationStatus,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("no application recorded for {0}")]
    NotFound(PairKey),
    #[error("stored score {stored} for {key} does not match expected {expected}")]
    ScoreMismatch {
        key: PairKey,
        expected: Score,
        stored: Score,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
