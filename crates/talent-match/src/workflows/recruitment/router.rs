use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CandidateId, JobId};
use super::error::RecruitmentError;
use super::intake::{JobRequest, ResumeSubmission};
use super::service::RecruitmentService;
use super::store::RecruitmentStore;
use super::transitions::TransitionReceipt;

const DEFAULT_TOP_MATCHES: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ShortlistRequest {
    pub(crate) candidate_id: CandidateId,
    pub(crate) job_id: JobId,
    pub(crate) score: f64,
    #[serde(default)]
    pub(crate) send_email: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) candidate_id: CandidateId,
    pub(crate) job_id: JobId,
    pub(crate) score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TopMatchesQuery {
    pub(crate) limit: Option<i64>,
}

/// Router builder exposing job posting, intake, triage, and dashboard endpoints.
pub fn recruitment_router<S>(service: Arc<RecruitmentService<S>>) -> Router
where
    S: RecruitmentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            post(post_job_handler::<S>).get(list_jobs_handler::<S>),
        )
        .route("/api/v1/candidates", post(ingest_candidate_handler::<S>))
        .route("/api/v1/jobs/:job_id/matches", get(matches_handler::<S>))
        .route(
            "/api/v1/applications/shortlist",
            post(shortlist_handler::<S>),
        )
        .route("/api/v1/applications/reject", post(reject_handler::<S>))
        .route(
            "/api/v1/dashboard/jobs/:job_id/top-matches",
            get(top_matches_handler::<S>),
        )
        .route(
            "/api/v1/dashboard/jobs/:job_id/stats",
            get(stats_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn post_job_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    request: Result<axum::Json<JobRequest>, JsonRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    match service.post_job(request).await {
        Ok(posted) => {
            let payload = json!({
                "message": "Job created successfully",
                "job_id": posted.job.job_id,
                "title": posted.job.title,
                "fan_out": posted.fan_out,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_jobs_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    match service.jobs() {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn ingest_candidate_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    submission: Result<axum::Json<ResumeSubmission>, JsonRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let axum::Json(submission) = match submission {
        Ok(submission) => submission,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    match service.ingest_candidate(submission).await {
        Ok(ingested) => {
            let payload = json!({
                "message": "Resume uploaded successfully",
                "candidate_id": ingested.candidate.candidate_id,
                "name": ingested.candidate.name,
                "email": ingested.candidate.email,
                "fan_out": ingested.fan_out,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn matches_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let Path(job_id) = match job_id {
        Ok(job_id) => job_id,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    match service.matches(JobId(job_id)) {
        Ok(matches) => (StatusCode::OK, axum::Json(matches)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn shortlist_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    request: Result<axum::Json<ShortlistRequest>, JsonRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    let result = service
        .shortlist(
            request.candidate_id,
            request.job_id,
            request.score,
            request.send_email,
        )
        .await;
    match result {
        Ok(receipt) => transition_response("Candidate shortlisted successfully", receipt),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    request: Result<axum::Json<RejectRequest>, JsonRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    match service
        .reject(request.candidate_id, request.job_id, request.score)
        .await
    {
        Ok(receipt) => transition_response("Candidate rejected", receipt),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn top_matches_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    job_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<TopMatchesQuery>, QueryRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let Path(job_id) = match job_id {
        Ok(job_id) => job_id,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    let limit = query.limit.unwrap_or(DEFAULT_TOP_MATCHES);
    match service.top_matches(JobId(job_id), limit) {
        Ok(top) => (StatusCode::OK, axum::Json(top)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<S>(
    State(service): State<Arc<RecruitmentService<S>>>,
    job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: RecruitmentStore + 'static,
{
    let Path(job_id) = match job_id {
        Ok(job_id) => job_id,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    match service.stats(JobId(job_id)) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

fn transition_response(message: &str, receipt: TransitionReceipt) -> Response {
    let payload = json!({
        "message": message,
        "email_sent": receipt.notification.was_sent(),
        "changed": receipt.changed,
        "notification": receipt.notification,
        "application": receipt.application,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) fn status_for(err: &RecruitmentError) -> StatusCode {
    match err {
        RecruitmentError::NotFound(_) => StatusCode::NOT_FOUND,
        RecruitmentError::InvalidArgument(_) | RecruitmentError::InvalidScore(_) => {
            StatusCode::BAD_REQUEST
        }
        RecruitmentError::ScoreMismatch { .. } => StatusCode::CONFLICT,
        RecruitmentError::ScoringTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        RecruitmentError::Scoring(_) => StatusCode::BAD_GATEWAY,
        RecruitmentError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Extractor failures share the JSON error shape of every other bad request.
fn rejected(message: String) -> Response {
    error_response(RecruitmentError::InvalidArgument(message))
}

fn error_response(err: RecruitmentError) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (status_for(&err), axum::Json(payload)).into_response()
}
