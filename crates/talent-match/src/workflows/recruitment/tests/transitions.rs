use std::sync::Arc;

use super::common::*;
use crate::workflows::recruitment::domain::{
    Application, ApplicationStatus, CandidateId, PairKey, Score,
};
use crate::workflows::recruitment::error::{MissingRecord, RecruitmentError};
use crate::workflows::recruitment::notification::{NotificationDispatcher, NotificationOutcome};
use crate::workflows::recruitment::store::ScoreStore;
use crate::workflows::recruitment::DisabledDispatcher;

#[tokio::test]
async fn shortlist_twice_is_an_idempotent_success() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(75.0)),
        Arc::new(RecordingDispatcher::default()),
    );
    let candidate = seed_candidate(&store, "Ada", Some("ada@example.com"));
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let first = service
        .shortlist(candidate, job, 75.0, false)
        .await
        .expect("shortlists");
    assert!(first.changed);
    assert_eq!(first.application.status, ApplicationStatus::Shortlisted);
    assert_eq!(first.notification, NotificationOutcome::NotRequested);

    let second = service
        .shortlist(candidate, job, 75.0, false)
        .await
        .expect("repeat is not an error");
    assert!(!second.changed);
    assert_eq!(second.application.status, ApplicationStatus::Shortlisted);
    assert_eq!(second.application.version, first.application.version);
}

#[tokio::test]
async fn later_decision_overrides_earlier_one() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(64.5)),
        Arc::new(RecordingDispatcher::default()),
    );
    let first = seed_candidate(&store, "Ada", None);
    let second = seed_candidate(&store, "Grace", None);
    let job = seed_job(&store, "Analyst");
    service.engine().fan_out_job(job).await.expect("fan-out");

    service.shortlist(first, job, 64.5, false).await.expect("shortlist");
    let rejected = service.reject(first, job, 64.5).await.expect("reject");
    assert_eq!(rejected.application.status, ApplicationStatus::Rejected);

    service.reject(second, job, 64.5).await.expect("reject");
    let shortlisted = service
        .shortlist(second, job, 64.5, false)
        .await
        .expect("shortlist");
    assert_eq!(shortlisted.application.status, ApplicationStatus::Shortlisted);
    assert_eq!(shortlisted.application.version, 2);
}

#[tokio::test]
async fn stale_score_is_refused_and_status_kept() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(75.0)),
        Arc::new(RecordingDispatcher::default()),
    );
    let candidate = seed_candidate(&store, "Ada", None);
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let err = service
        .shortlist(candidate, job, 60.0, true)
        .await
        .expect_err("mismatch");
    assert_eq!(
        err,
        RecruitmentError::ScoreMismatch {
            key: PairKey::new(candidate, job),
            supplied: Score::from_points(60.0).expect("valid"),
            stored: Score::from_points(75.0).expect("valid"),
        }
    );

    let stored = store
        .fetch(PairKey::new(candidate, job))
        .expect("reads")
        .expect("present");
    assert_eq!(stored.status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn transitions_on_unscored_pairs_are_not_found() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(75.0)),
        Arc::new(RecordingDispatcher::default()),
    );
    let job = seed_job(&store, "Analyst");
    let key = PairKey::new(CandidateId(3), job);

    assert_eq!(
        service.reject(CandidateId(3), job, 75.0).await,
        Err(RecruitmentError::NotFound(MissingRecord::Application(key)))
    );
}

#[tokio::test]
async fn malformed_remembered_score_is_an_invalid_argument() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(75.0)),
        Arc::new(RecordingDispatcher::default()),
    );
    let candidate = seed_candidate(&store, "Ada", None);
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let err = service
        .reject(candidate, job, f64::NAN)
        .await
        .expect_err("invalid");
    assert!(matches!(err, RecruitmentError::InvalidArgument(_)));
}

#[tokio::test]
async fn remembered_score_finer_than_a_hundredth_is_refused() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(75.0)),
        Arc::new(RecordingDispatcher::default()),
    );
    let candidate = seed_candidate(&store, "Ada", None);
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let err = service
        .shortlist(candidate, job, 74.996, false)
        .await
        .expect_err("not a served score");
    assert!(matches!(err, RecruitmentError::InvalidArgument(_)));

    let stored = store
        .fetch(PairKey::new(candidate, job))
        .expect("reads")
        .expect("present");
    assert_eq!(stored.status, ApplicationStatus::Pending);

    let receipt = service
        .shortlist(candidate, job, 75.0, false)
        .await
        .expect("exact score accepted");
    assert_eq!(receipt.application.status, ApplicationStatus::Shortlisted);
}

#[tokio::test]
async fn two_decimal_scores_survive_float_noise() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(72.15)),
        Arc::new(RecordingDispatcher::default()),
    );
    let candidate = seed_candidate(&store, "Ada", None);
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let receipt = service
        .reject(candidate, job, 72.15)
        .await
        .expect("served score accepted");
    assert_eq!(receipt.application.status, ApplicationStatus::Rejected);
}

#[tokio::test]
async fn shortlist_notifies_when_asked() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let (service, store) =
        build_service(Arc::new(FixedScorer::uniform(88.0)), dispatcher.clone());
    let candidate = seed_candidate(&store, "Ada", Some("ada@example.com"));
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let receipt = service
        .shortlist(candidate, job, 88.0, true)
        .await
        .expect("shortlists");
    assert_eq!(receipt.notification, NotificationOutcome::Sent);

    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].candidate_email, "ada@example.com");
    assert_eq!(sent[0].job_title, "Analyst");
    assert_eq!(sent[0].candidate_name.as_deref(), Some("Ada"));

    service.reject(candidate, job, 88.0).await.expect("reject");
    assert_eq!(dispatcher.sent().len(), 1, "reject never notifies");
}

#[tokio::test]
async fn notification_is_skipped_without_an_email() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let (service, store) =
        build_service(Arc::new(FixedScorer::uniform(88.0)), dispatcher.clone());
    let candidate = seed_candidate(&store, "Ada", None);
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let receipt = service
        .shortlist(candidate, job, 88.0, true)
        .await
        .expect("shortlists");
    assert!(matches!(
        receipt.notification,
        NotificationOutcome::Skipped { .. }
    ));
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn notification_names_a_missing_candidate_record() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let (service, store) =
        build_service(Arc::new(FixedScorer::uniform(80.0)), dispatcher.clone());
    let job = seed_job(&store, "Analyst");
    let orphan = CandidateId(99);
    store
        .insert_if_absent(Application::pending(
            PairKey::new(orphan, job),
            Score::from_points(80.0).expect("valid"),
        ))
        .expect("inserted");

    let receipt = service
        .shortlist(orphan, job, 80.0, true)
        .await
        .expect("status change still succeeds");
    match receipt.notification {
        NotificationOutcome::Failed { reason } => {
            assert!(reason.contains("candidate 99"), "unexpected reason: {reason}")
        }
        other => panic!("expected a failed notification, got {other:?}"),
    }
    assert_eq!(receipt.application.status, ApplicationStatus::Shortlisted);
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn dispatch_failures_do_not_revert_the_shortlist() {
    let dispatchers: Vec<Arc<dyn NotificationDispatcher>> = vec![
        Arc::new(FailingDispatcher),
        Arc::new(HangingDispatcher),
        Arc::new(DisabledDispatcher),
    ];
    for dispatcher in dispatchers {
        let (service, store) = build_service(Arc::new(FixedScorer::uniform(91.0)), dispatcher);
        let candidate = seed_candidate(&store, "Ada", Some("ada@example.com"));
        let job = seed_job(&store, "Analyst");
        service.compute_and_store(candidate, job).await.expect("scored");

        let receipt = service
            .shortlist(candidate, job, 91.0, true)
            .await
            .expect("status change still succeeds");
        assert!(matches!(
            receipt.notification,
            NotificationOutcome::Failed { .. }
        ));

        let stored = store
            .fetch(PairKey::new(candidate, job))
            .expect("reads")
            .expect("present");
        assert_eq!(stored.status, ApplicationStatus::Shortlisted);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_transitions_leave_one_consistent_status() {
    let (service, store) = build_service(
        Arc::new(FixedScorer::uniform(66.0)),
        Arc::new(RecordingDispatcher::default()),
    );
    let candidate = seed_candidate(&store, "Ada", None);
    let job = seed_job(&store, "Analyst");
    service.compute_and_store(candidate, job).await.expect("scored");

    let tasks: Vec<_> = (0..32)
        .map(|index| {
            let service = service.clone();
            tokio::spawn(async move {
                if index % 2 == 0 {
                    service.shortlist(candidate, job, 66.0, false).await
                } else {
                    service.reject(candidate, job, 66.0).await
                }
            })
        })
        .collect();

    let mut changes = 0;
    for task in tasks {
        let receipt = task.await.expect("joins").expect("transition succeeds");
        assert_eq!(receipt.application.score.to_string(), "66.00");
        if receipt.changed {
            changes += 1;
        }
    }

    let stored = store
        .fetch(PairKey::new(candidate, job))
        .expect("reads")
        .expect("present");
    assert_ne!(stored.status, ApplicationStatus::Pending);
    assert_eq!(stored.version, changes, "every committed change bumps the version once");
}
