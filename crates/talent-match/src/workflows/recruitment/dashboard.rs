use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;

use super::domain::{
    Application, ApplicationStatus, CandidateId, Job, JobId, Score, ScoreTier,
};
use super::error::{MissingRecord, RecruitmentError};
use super::store::RecruitmentStore;

/// Application joined with the candidate's display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchView {
    pub candidate_id: CandidateId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub score: Score,
    pub tier: ScoreTier,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMatches {
    pub job_id: JobId,
    pub job_title: String,
    pub total_candidates: usize,
    pub top_matches: Vec<MatchView>,
}

/// Per-job status counts. `total_applications` always equals the sum of the three buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub job_id: JobId,
    pub job_title: String,
    pub total_applications: usize,
    pub shortlisted: usize,
    pub pending: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub job_id: JobId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListing {
    pub total: usize,
    pub jobs: Vec<JobSummary>,
}

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Read-only views over the score store. Nothing here writes.
pub struct DashboardAggregator<S> {
    store: Arc<S>,
}

impl<S> DashboardAggregator<S>
where
    S: RecruitmentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Highest-scoring applications for a job, ties broken by ascending candidate id.
    pub fn top_matches(&self, job_id: JobId, limit: i64) -> Result<TopMatches, RecruitmentError> {
        let limit = usize::try_from(limit)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                RecruitmentError::invalid_argument(format!(
                    "limit must be a positive integer, got {limit}"
                ))
            })?;

        let job = self.require_job(job_id)?;
        let mut applications = self.store.applications_for_job(job_id)?;
        let total_candidates = applications.len();
        rank(&mut applications);
        applications.truncate(limit.get());

        Ok(TopMatches {
            job_id,
            job_title: job.title,
            total_candidates,
            top_matches: self.join_candidates(applications)?,
        })
    }

    /// Every application for a job, in ranking order.
    pub fn matches(&self, job_id: JobId) -> Result<Vec<MatchView>, RecruitmentError> {
        self.require_job(job_id)?;
        let mut applications = self.store.applications_for_job(job_id)?;
        rank(&mut applications);
        self.join_candidates(applications)
    }

    pub fn stats(&self, job_id: JobId) -> Result<JobStats, RecruitmentError> {
        let job = self.require_job(job_id)?;
        let applications = self.store.applications_for_job(job_id)?;

        let mut stats = JobStats {
            job_id,
            job_title: job.title,
            total_applications: 0,
            shortlisted: 0,
            pending: 0,
            rejected: 0,
        };
        for application in &applications {
            match application.status {
                ApplicationStatus::Pending => stats.pending += 1,
                ApplicationStatus::Shortlisted => stats.shortlisted += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
            }
        }
        stats.total_applications = stats.pending + stats.shortlisted + stats.rejected;
        Ok(stats)
    }

    pub fn jobs(&self) -> Result<JobListing, RecruitmentError> {
        let jobs: Vec<JobSummary> = self
            .store
            .jobs()?
            .into_iter()
            .map(|job| JobSummary {
                job_id: job.job_id,
                title: job.title,
                description: preview(&job.description),
            })
            .collect();
        Ok(JobListing {
            total: jobs.len(),
            jobs,
        })
    }

    fn require_job(&self, job_id: JobId) -> Result<Job, RecruitmentError> {
        self.store
            .job(job_id)?
            .ok_or(RecruitmentError::NotFound(MissingRecord::Job(job_id)))
    }

    fn join_candidates(
        &self,
        applications: Vec<Application>,
    ) -> Result<Vec<MatchView>, RecruitmentError> {
        applications
            .into_iter()
            .map(|application| {
                let candidate = self.store.candidate(application.candidate_id)?;
                let (name, email) = candidate
                    .map(|candidate| (candidate.name, candidate.email))
                    .unwrap_or_default();
                Ok(MatchView {
                    candidate_id: application.candidate_id,
                    name,
                    email,
                    score: application.score,
                    tier: application.score.tier(),
                    status: application.status,
                })
            })
            .collect()
    }
}

fn rank(applications: &mut [Application]) {
    applications.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => a.candidate_id.cmp(&b.candidate_id),
        other => other,
    });
}

fn preview(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let head: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_descriptions() {
        let long = "x".repeat(250);
        let shortened = preview(&long);
        assert_eq!(shortened.chars().count(), 203);
        assert!(shortened.ends_with("..."));
        assert_eq!(preview("short description"), "short description");
    }
}
