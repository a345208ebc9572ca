//! Candidate/job matching, application triage, and recruiter dashboard views.
//!
//! Applications are created once per (candidate, job) pair by the matching engine, change
//! status only through the transition service, and are read by the dashboard aggregator.

pub mod dashboard;
pub mod domain;
pub mod engine;
pub mod error;
pub mod intake;
pub mod memory;
pub mod notification;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use dashboard::{DashboardAggregator, JobListing, JobStats, JobSummary, MatchView, TopMatches};
pub use domain::{
    Application, ApplicationStatus, Candidate, CandidateDraft, CandidateId, InvalidScore, Job,
    JobId, JobPosting, PairKey, ReviewDecision, Score, ScoreTier,
};
pub use engine::{
    FanOutReport, MatchingEngine, MatchingSettings, ScoreOutcome, ScoringDisposition,
};
pub use error::{MissingRecord, RecruitmentError};
pub use intake::{JobRequest, ResumeSubmission};
pub use memory::InMemoryRecruitmentStore;
pub use notification::{
    DisabledDispatcher, DispatchError, NotificationDispatcher, NotificationOutcome,
    ShortlistNotice,
};
pub use router::recruitment_router;
pub use scoring::{KeywordOverlapScorer, MatchScorer, ScoringError};
pub use service::{FanOutMode, IngestedCandidate, PostedJob, RecruitmentService, ServiceSettings};
pub use store::{Insertion, RecruitmentStore, Roster, ScoreStore, StatusChange, StoreError};
pub use transitions::{StatusTransitionService, TransitionReceipt};
