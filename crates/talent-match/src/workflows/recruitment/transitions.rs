use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Application, CandidateId, JobId, PairKey, ReviewDecision, Score};
use super::error::{MissingRecord, RecruitmentError};
use super::notification::{
    DispatchError, NotificationDispatcher, NotificationOutcome, ShortlistNotice,
};
use super::store::{RecruitmentStore, StatusChange};

const HUNDREDTH_TOLERANCE: f64 = 1e-6;

/// Committed transition plus the fate of any requested notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionReceipt {
    pub application: Application,
    pub changed: bool,
    pub notification: NotificationOutcome,
}

/// Applies recruiter decisions to stored applications.
pub struct StatusTransitionService<S> {
    store: Arc<S>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    dispatch_timeout: Duration,
}

impl<S> StatusTransitionService<S>
where
    S: RecruitmentStore,
{
    pub fn new(
        store: Arc<S>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            dispatch_timeout,
        }
    }

    /// Move the application to shortlisted, optionally notifying the candidate afterwards.
    ///
    /// `remembered_score` is the score the caller last saw; the transition is refused when it
    /// differs from the stored one.
    pub async fn shortlist(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
        remembered_score: f64,
        notify: bool,
    ) -> Result<TransitionReceipt, RecruitmentError> {
        let key = PairKey::new(candidate_id, job_id);
        let change = self.commit(key, remembered_score, ReviewDecision::Shortlist)?;

        let notification = if notify {
            self.notify_shortlisted(key).await
        } else {
            NotificationOutcome::NotRequested
        };

        Ok(TransitionReceipt {
            application: change.application,
            changed: change.changed,
            notification,
        })
    }

    pub async fn reject(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
        remembered_score: f64,
    ) -> Result<TransitionReceipt, RecruitmentError> {
        let key = PairKey::new(candidate_id, job_id);
        let change = self.commit(key, remembered_score, ReviewDecision::Reject)?;
        Ok(TransitionReceipt {
            application: change.application,
            changed: change.changed,
            notification: NotificationOutcome::NotRequested,
        })
    }

    fn commit(
        &self,
        key: PairKey,
        remembered_score: f64,
        decision: ReviewDecision,
    ) -> Result<StatusChange, RecruitmentError> {
        let expected = remembered(remembered_score)?;

        let change = self
            .store
            .apply_decision(key, expected, decision)
            .inspect_err(|err| {
                warn!(
                    candidate_id = %key.candidate_id,
                    job_id = %key.job_id,
                    error = %err,
                    "status transition refused"
                );
            })?;

        info!(
            candidate_id = %key.candidate_id,
            job_id = %key.job_id,
            score = %change.application.score,
            from = change.previous.label(),
            to = change.application.status.label(),
            changed = change.changed,
            "application status committed"
        );
        Ok(change)
    }

    async fn notify_shortlisted(&self, key: PairKey) -> NotificationOutcome {
        let notice = match self.shortlist_notice(key) {
            Ok(Some(notice)) => notice,
            Ok(None) => {
                info!(candidate_id = %key.candidate_id, "candidate has no e-mail; notification skipped");
                return NotificationOutcome::Skipped {
                    reason: "candidate has no e-mail address".to_string(),
                };
            }
            Err(err) => {
                warn!(
                    candidate_id = %key.candidate_id,
                    job_id = %key.job_id,
                    error = %err,
                    "could not assemble shortlist notification"
                );
                return NotificationOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let result = tokio::time::timeout(self.dispatch_timeout, self.dispatcher.dispatch(notice))
            .await
            .unwrap_or(Err(DispatchError::TimedOut(self.dispatch_timeout)));

        match result {
            Ok(()) => NotificationOutcome::Sent,
            Err(err) => {
                warn!(
                    candidate_id = %key.candidate_id,
                    job_id = %key.job_id,
                    error = %err,
                    "shortlist notification failed; status change kept"
                );
                NotificationOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// `Ok(None)` only when the candidate has no e-mail address; missing records are errors.
    fn shortlist_notice(&self, key: PairKey) -> Result<Option<ShortlistNotice>, RecruitmentError> {
        let candidate = self
            .store
            .candidate(key.candidate_id)?
            .ok_or(RecruitmentError::NotFound(MissingRecord::Candidate(
                key.candidate_id,
            )))?;
        let job = self
            .store
            .job(key.job_id)?
            .ok_or(RecruitmentError::NotFound(MissingRecord::Job(key.job_id)))?;

        Ok(candidate.email.map(|email| ShortlistNotice {
            candidate_name: candidate.name,
            candidate_email: email,
            job_title: job.title,
        }))
    }
}

/// Remembered scores must already sit on a hundredth; anything finer was never served.
fn remembered(points: f64) -> Result<Score, RecruitmentError> {
    let hundredths = points * 100.0;
    if hundredths.is_finite() && (hundredths - hundredths.round()).abs() > HUNDREDTH_TOLERANCE {
        return Err(RecruitmentError::invalid_argument(format!(
            "remembered score {points} has more than two decimal places"
        )));
    }
    Score::from_points(points).map_err(|err| {
        RecruitmentError::invalid_argument(format!("remembered score rejected: {err}"))
    })
}
