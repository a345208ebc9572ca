use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::workflows::recruitment::domain::{
    Candidate, CandidateDraft, CandidateId, Job, JobId, JobPosting,
};
use crate::workflows::recruitment::notification::{
    DispatchError, NotificationDispatcher, ShortlistNotice,
};
use crate::workflows::recruitment::scoring::{MatchScorer, ScoringError};
use crate::workflows::recruitment::store::Roster;
use crate::workflows::recruitment::{
    FanOutMode, InMemoryRecruitmentStore, MatchingSettings, RecruitmentService, ServiceSettings,
};

/// Returns preset scores per pair and counts how often it was asked.
#[derive(Default)]
pub(super) struct FixedScorer {
    scores: HashMap<(u64, u64), f64>,
    fallback: f64,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FixedScorer {
    pub(super) fn uniform(score: f64) -> Self {
        Self {
            fallback: score,
            ..Self::default()
        }
    }

    pub(super) fn with(mut self, candidate: u64, job: u64, score: f64) -> Self {
        self.scores.insert((candidate, job), score);
        self
    }

    pub(super) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchScorer for FixedScorer {
    async fn score(&self, candidate: &Candidate, job: &Job) -> Result<f64, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .scores
            .get(&(candidate.candidate_id.0, job.job_id.0))
            .copied()
            .unwrap_or(self.fallback))
    }
}

/// Stalls on the first call only, so a timed-out attempt can be followed by a fast retry.
#[derive(Default)]
pub(super) struct SlowFirstScorer {
    calls: AtomicUsize,
}

#[async_trait]
impl MatchScorer for SlowFirstScorer {
    async fn score(&self, _candidate: &Candidate, _job: &Job) -> Result<f64, ScoringError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(42.0)
    }
}

pub(super) struct UnavailableScorer;

#[async_trait]
impl MatchScorer for UnavailableScorer {
    async fn score(&self, _candidate: &Candidate, _job: &Job) -> Result<f64, ScoringError> {
        Err(ScoringError::Unavailable("embedding backend offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingDispatcher {
    sent: Mutex<Vec<ShortlistNotice>>,
}

impl RecordingDispatcher {
    pub(super) fn sent(&self) -> Vec<ShortlistNotice> {
        self.sent.lock().expect("dispatcher mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notice: ShortlistNotice) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(&self, _notice: ShortlistNotice) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("smtp connection refused".to_string()))
    }
}

pub(super) struct HangingDispatcher;

#[async_trait]
impl NotificationDispatcher for HangingDispatcher {
    async fn dispatch(&self, _notice: ShortlistNotice) -> Result<(), DispatchError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

pub(super) fn settings(mode: FanOutMode) -> ServiceSettings {
    ServiceSettings {
        matching: MatchingSettings {
            fan_out_concurrency: 4,
            scoring_timeout: Duration::from_millis(200),
        },
        fan_out_mode: mode,
        dispatch_timeout: Duration::from_millis(100),
    }
}

pub(super) fn build_service(
    scorer: Arc<dyn MatchScorer>,
    dispatcher: Arc<dyn NotificationDispatcher>,
) -> (
    Arc<RecruitmentService<InMemoryRecruitmentStore>>,
    Arc<InMemoryRecruitmentStore>,
) {
    let store = Arc::new(InMemoryRecruitmentStore::new());
    let service = Arc::new(RecruitmentService::new(
        store.clone(),
        scorer,
        dispatcher,
        settings(FanOutMode::Inline),
    ));
    (service, store)
}

pub(super) fn resume_text(name: &str, email: &str, skills: &str) -> String {
    format!("{name}\n{email}\nExperienced professional. Skills: {skills}. Open to relocation.")
}

pub(super) fn seed_candidate(
    store: &InMemoryRecruitmentStore,
    name: &str,
    email: Option<&str>,
) -> CandidateId {
    store
        .add_candidate(CandidateDraft {
            name: Some(name.to_string()),
            email: email.map(str::to_string),
            resume_text: resume_text(name, email.unwrap_or(""), "rust tokio axum"),
        })
        .expect("candidate stored")
        .candidate_id
}

pub(super) fn seed_job(store: &InMemoryRecruitmentStore, title: &str) -> JobId {
    store
        .add_job(JobPosting {
            title: title.to_string(),
            description: format!("{title} working on rust services with tokio"),
        })
        .expect("job stored")
        .job_id
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(method: &str, uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serializes"),
        ))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}
