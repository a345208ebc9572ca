use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::dashboard::{DashboardAggregator, JobListing, JobStats, MatchView, TopMatches};
use super::domain::{Candidate, CandidateId, Job, JobId};
use super::engine::{FanOutReport, MatchingEngine, MatchingSettings, ScoreOutcome};
use super::error::RecruitmentError;
use super::intake::{JobRequest, ResumeSubmission};
use super::notification::NotificationDispatcher;
use super::scoring::MatchScorer;
use super::store::RecruitmentStore;
use super::transitions::{StatusTransitionService, TransitionReceipt};

/// How creation requests wait on the fan-out they trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOutMode {
    /// Spawn the fan-out and return immediately; unscored pairs are absent until inserted.
    #[default]
    Background,
    /// Await the fan-out and include its report in the response.
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    pub matching: MatchingSettings,
    pub fan_out_mode: FanOutMode,
    pub dispatch_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            matching: MatchingSettings::default(),
            fan_out_mode: FanOutMode::default(),
            dispatch_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostedJob {
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_out: Option<FanOutReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedCandidate {
    pub candidate: Candidate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_out: Option<FanOutReport>,
}

/// Facade composing the matching engine, status transitions, and dashboard over one store.
pub struct RecruitmentService<S> {
    store: Arc<S>,
    engine: Arc<MatchingEngine<S>>,
    transitions: StatusTransitionService<S>,
    dashboard: DashboardAggregator<S>,
    fan_out_mode: FanOutMode,
}

impl<S> RecruitmentService<S>
where
    S: RecruitmentStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        scorer: Arc<dyn MatchScorer>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        settings: ServiceSettings,
    ) -> Self {
        let engine = Arc::new(MatchingEngine::new(
            store.clone(),
            scorer,
            settings.matching,
        ));
        let transitions =
            StatusTransitionService::new(store.clone(), dispatcher, settings.dispatch_timeout);
        let dashboard = DashboardAggregator::new(store.clone());

        Self {
            store,
            engine,
            transitions,
            dashboard,
            fan_out_mode: settings.fan_out_mode,
        }
    }

    pub fn engine(&self) -> &Arc<MatchingEngine<S>> {
        &self.engine
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate and store a job, then fan out scoring over every known candidate.
    pub async fn post_job(&self, request: JobRequest) -> Result<PostedJob, RecruitmentError> {
        let posting = request.validate()?;
        let job = self.store.add_job(posting)?;
        info!(job_id = %job.job_id, title = %job.title, "job posted");

        let fan_out = match self.fan_out_mode {
            FanOutMode::Inline => Some(self.engine.fan_out_job(job.job_id).await?),
            FanOutMode::Background => {
                let engine = self.engine.clone();
                let job_id = job.job_id;
                tokio::spawn(async move {
                    if let Err(err) = engine.fan_out_job(job_id).await {
                        warn!(%job_id, error = %err, "background job fan-out aborted");
                    }
                });
                None
            }
        };

        Ok(PostedJob { job, fan_out })
    }

    /// Register a plain-text résumé, then fan out scoring over every posted job.
    pub async fn ingest_candidate(
        &self,
        submission: ResumeSubmission,
    ) -> Result<IngestedCandidate, RecruitmentError> {
        let draft = submission.into_draft()?;
        let candidate = self.store.add_candidate(draft)?;
        info!(candidate_id = %candidate.candidate_id, "candidate registered");

        let fan_out = match self.fan_out_mode {
            FanOutMode::Inline => Some(
                self.engine
                    .fan_out_candidate(candidate.candidate_id)
                    .await?,
            ),
            FanOutMode::Background => {
                let engine = self.engine.clone();
                let candidate_id = candidate.candidate_id;
                tokio::spawn(async move {
                    if let Err(err) = engine.fan_out_candidate(candidate_id).await {
                        warn!(%candidate_id, error = %err, "background candidate fan-out aborted");
                    }
                });
                None
            }
        };

        Ok(IngestedCandidate { candidate, fan_out })
    }

    pub async fn compute_and_store(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<ScoreOutcome, RecruitmentError> {
        self.engine.compute_and_store(candidate_id, job_id).await
    }

    pub async fn shortlist(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
        remembered_score: f64,
        send_email: bool,
    ) -> Result<TransitionReceipt, RecruitmentError> {
        self.transitions
            .shortlist(candidate_id, job_id, remembered_score, send_email)
            .await
    }

    pub async fn reject(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
        remembered_score: f64,
    ) -> Result<TransitionReceipt, RecruitmentError> {
        self.transitions
            .reject(candidate_id, job_id, remembered_score)
            .await
    }

    pub fn jobs(&self) -> Result<JobListing, RecruitmentError> {
        self.dashboard.jobs()
    }

    pub fn matches(&self, job_id: JobId) -> Result<Vec<MatchView>, RecruitmentError> {
        self.dashboard.matches(job_id)
    }

    pub fn top_matches(&self, job_id: JobId, limit: i64) -> Result<TopMatches, RecruitmentError> {
        self.dashboard.top_matches(job_id, limit)
    }

    pub fn stats(&self, job_id: JobId) -> Result<JobStats, RecruitmentError> {
        self.dashboard.stats(job_id)
    }
}
