use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::domain::{Application, CandidateId, JobId, PairKey, Score};
use super::error::{MissingRecord, RecruitmentError};
use super::scoring::MatchScorer;
use super::store::{Insertion, RecruitmentStore};

/// Tuning knobs for scoring and fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingSettings {
    pub fan_out_concurrency: usize,
    pub scoring_timeout: Duration,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            fan_out_concurrency: 8,
            scoring_timeout: Duration::from_secs(5),
        }
    }
}

/// Whether an application was created by this call or already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringDisposition {
    Scored,
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub application: Application,
    pub disposition: ScoringDisposition,
}

/// Tally of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub scheduled: usize,
    pub scored: usize,
    pub already_present: usize,
    pub failed: usize,
}

/// Scores candidate/job pairs and records each pair exactly once.
///
/// Calls for the same pair are serialized through a per-pair gate so the scorer runs at most
/// once per pair; unrelated pairs never wait on each other.
pub struct MatchingEngine<S> {
    store: Arc<S>,
    scorer: Arc<dyn MatchScorer>,
    gates: DashMap<PairKey, Arc<Mutex<()>>>,
    settings: MatchingSettings,
}

impl<S> MatchingEngine<S>
where
    S: RecruitmentStore + 'static,
{
    pub fn new(store: Arc<S>, scorer: Arc<dyn MatchScorer>, settings: MatchingSettings) -> Self {
        Self {
            store,
            scorer,
            gates: DashMap::new(),
            settings: MatchingSettings {
                fan_out_concurrency: settings.fan_out_concurrency.max(1),
                ..settings
            },
        }
    }

    pub fn settings(&self) -> MatchingSettings {
        self.settings
    }

    /// Score the pair and insert a pending application, or return the stored one untouched.
    ///
    /// Cancelling the returned future or hitting the scoring timeout leaves no record behind:
    /// the insert only happens once a validated score is in hand.
    pub async fn compute_and_store(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<ScoreOutcome, RecruitmentError> {
        let key = PairKey::new(candidate_id, job_id);
        if let Some(existing) = self.store.fetch(key)? {
            return Ok(already_present(existing));
        }

        let candidate = self
            .store
            .candidate(candidate_id)?
            .ok_or(RecruitmentError::NotFound(MissingRecord::Candidate(
                candidate_id,
            )))?;
        let job = self
            .store
            .job(job_id)?
            .ok_or(RecruitmentError::NotFound(MissingRecord::Job(job_id)))?;

        let _slot = self.acquire(key).await;
        if let Some(existing) = self.store.fetch(key)? {
            return Ok(already_present(existing));
        }

        let raw = tokio::time::timeout(
            self.settings.scoring_timeout,
            self.scorer.score(&candidate, &job),
        )
        .await
        .map_err(|_| RecruitmentError::ScoringTimeout(self.settings.scoring_timeout))??;

        let score = Score::from_points(raw).inspect_err(|_| {
            warn!(%candidate_id, %job_id, raw, "scorer returned an out-of-range value");
        })?;

        match self.store.insert_if_absent(Application::pending(key, score))? {
            Insertion::Inserted(application) => {
                debug!(%candidate_id, %job_id, %score, "application scored");
                Ok(ScoreOutcome {
                    application,
                    disposition: ScoringDisposition::Scored,
                })
            }
            Insertion::Existing(application) => Ok(already_present(application)),
        }
    }

    /// Score every existing candidate against a newly posted job.
    pub async fn fan_out_job(&self, job_id: JobId) -> Result<FanOutReport, RecruitmentError> {
        if self.store.job(job_id)?.is_none() {
            return Err(RecruitmentError::NotFound(MissingRecord::Job(job_id)));
        }
        let pairs = self
            .store
            .candidates()?
            .into_iter()
            .map(|candidate| PairKey::new(candidate.candidate_id, job_id))
            .collect();
        let report = self.fan_out(pairs).await;
        info!(%job_id, ?report, "job fan-out finished");
        Ok(report)
    }

    /// Score a newly ingested candidate against every existing job.
    pub async fn fan_out_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<FanOutReport, RecruitmentError> {
        if self.store.candidate(candidate_id)?.is_none() {
            return Err(RecruitmentError::NotFound(MissingRecord::Candidate(
                candidate_id,
            )));
        }
        let pairs = self
            .store
            .jobs()?
            .into_iter()
            .map(|job| PairKey::new(candidate_id, job.job_id))
            .collect();
        let report = self.fan_out(pairs).await;
        info!(%candidate_id, ?report, "candidate fan-out finished");
        Ok(report)
    }

    async fn fan_out(&self, pairs: Vec<PairKey>) -> FanOutReport {
        let mut report = FanOutReport {
            scheduled: pairs.len(),
            ..FanOutReport::default()
        };

        let results: Vec<(PairKey, Result<ScoreOutcome, RecruitmentError>)> = stream::iter(pairs)
            .map(|key| async move {
                let result = self.compute_and_store(key.candidate_id, key.job_id).await;
                (key, result)
            })
            .buffer_unordered(self.settings.fan_out_concurrency)
            .collect()
            .await;

        for (key, result) in results {
            match result {
                Ok(outcome) => match outcome.disposition {
                    ScoringDisposition::Scored => report.scored += 1,
                    ScoringDisposition::AlreadyPresent => report.already_present += 1,
                },
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        candidate_id = %key.candidate_id,
                        job_id = %key.job_id,
                        error = %err,
                        "scoring failed during fan-out"
                    );
                }
            }
        }

        report
    }

    async fn acquire(&self, key: PairKey) -> PairSlot<'_> {
        let gate = self.gates.entry(key).or_default().clone();
        let guard = gate.lock_owned().await;
        PairSlot {
            gates: &self.gates,
            key,
            guard: Some(guard),
        }
    }
}

fn already_present(application: Application) -> ScoreOutcome {
    ScoreOutcome {
        application,
        disposition: ScoringDisposition::AlreadyPresent,
    }
}

/// Held while a pair is being scored; drops the gate entry once nobody else holds it.
struct PairSlot<'a> {
    gates: &'a DashMap<PairKey, Arc<Mutex<()>>>,
    key: PairKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PairSlot<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.gates
            .remove_if(&self.key, |_, gate| Arc::strong_count(gate) == 1);
    }
}
