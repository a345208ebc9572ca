use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::domain::{
    Application, Candidate, CandidateDraft, CandidateId, Job, JobId, JobPosting, PairKey,
    ReviewDecision, Score,
};
use super::store::{Insertion, Roster, ScoreStore, StatusChange, StoreError};

/// Sharded in-memory store.
///
/// Applications live in a `DashMap` keyed by pair, so inserts and status updates lock a single
/// shard rather than the whole arena. A per-job index of candidate ids keeps dashboard reads
/// from scanning every application.
#[derive(Debug)]
pub struct InMemoryRecruitmentStore {
    applications: DashMap<PairKey, Application>,
    by_job: DashMap<JobId, Vec<CandidateId>>,
    candidates: DashMap<CandidateId, Candidate>,
    jobs: DashMap<JobId, Job>,
    candidate_sequence: AtomicU64,
    job_sequence: AtomicU64,
}

impl Default for InMemoryRecruitmentStore {
    fn default() -> Self {
        Self {
            applications: DashMap::new(),
            by_job: DashMap::new(),
            candidates: DashMap::new(),
            jobs: DashMap::new(),
            candidate_sequence: AtomicU64::new(1),
            job_sequence: AtomicU64::new(1),
        }
    }
}

impl InMemoryRecruitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn application_count(&self) -> usize {
        self.applications.len()
    }
}

impl ScoreStore for InMemoryRecruitmentStore {
    fn insert_if_absent(&self, application: Application) -> Result<Insertion, StoreError> {
        let key = application.key();
        match self.applications.entry(key) {
            Entry::Occupied(existing) => Ok(Insertion::Existing(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(application.clone());
                self.by_job
                    .entry(key.job_id)
                    .or_default()
                    .push(key.candidate_id);
                Ok(Insertion::Inserted(application))
            }
        }
    }

    fn fetch(&self, key: PairKey) -> Result<Option<Application>, StoreError> {
        Ok(self.applications.get(&key).map(|entry| entry.value().clone()))
    }

    fn apply_decision(
        &self,
        key: PairKey,
        expected: Score,
        decision: ReviewDecision,
    ) -> Result<StatusChange, StoreError> {
        let mut entry = self
            .applications
            .get_mut(&key)
            .ok_or(StoreError::NotFound(key))?;

        let application = entry.value_mut();
        if application.score != expected {
            return Err(StoreError::ScoreMismatch {
                key,
                expected,
                stored: application.score,
            });
        }

        let previous = application.status;
        let changed = application.decide(decision);
        Ok(StatusChange {
            application: application.clone(),
            previous,
            changed,
        })
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError> {
        let candidate_ids = match self.by_job.get(&job_id) {
            Some(ids) => ids.value().clone(),
            None => return Ok(Vec::new()),
        };

        Ok(candidate_ids
            .into_iter()
            .filter_map(|candidate_id| {
                self.applications
                    .get(&PairKey::new(candidate_id, job_id))
                    .map(|entry| entry.value().clone())
            })
            .collect())
    }
}

impl Roster for InMemoryRecruitmentStore {
    fn add_candidate(&self, draft: CandidateDraft) -> Result<Candidate, StoreError> {
        let candidate_id = CandidateId(self.candidate_sequence.fetch_add(1, Ordering::Relaxed));
        let candidate = Candidate {
            candidate_id,
            name: draft.name,
            email: draft.email,
            resume_text: draft.resume_text,
        };
        self.candidates.insert(candidate_id, candidate.clone());
        Ok(candidate)
    }

    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        Ok(self.candidates.get(&id).map(|entry| entry.value().clone()))
    }

    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let mut candidates: Vec<Candidate> = self
            .candidates
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        candidates.sort_by_key(|candidate| candidate.candidate_id);
        Ok(candidates)
    }

    fn add_job(&self, posting: JobPosting) -> Result<Job, StoreError> {
        let job_id = JobId(self.job_sequence.fetch_add(1, Ordering::Relaxed));
        let job = Job {
            job_id,
            title: posting.title,
            description: posting.description,
        };
        self.jobs.insert(job_id, job.clone());
        Ok(job)
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.get(&id).map(|entry| entry.value().clone()))
    }

    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by_key(|job| job.job_id);
        Ok(jobs)
    }
}
