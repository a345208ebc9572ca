use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outbound hook invoked after a shortlist commits (e-mail, chat, or queue adapters).
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notice: ShortlistNotice) -> Result<(), DispatchError>;
}

/// Message sent to a candidate who has been shortlisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistNotice {
    pub candidate_name: Option<String>,
    pub candidate_email: String,
    pub job_title: String,
}

impl ShortlistNotice {
    pub fn subject(&self) -> String {
        format!(
            "Congratulations! You've been shortlisted for {}",
            self.job_title
        )
    }

    pub fn body(&self) -> String {
        let name = self.candidate_name.as_deref().unwrap_or("Candidate");
        format!(
            "Dear {name},\n\n\
             Congratulations! We are pleased to inform you that you have been shortlisted for \
             the position of {title}.\n\n\
             Our recruitment team was impressed with your qualifications and experience. We will \
             be in touch soon with the next steps in the hiring process.\n\n\
             Thank you for your interest in joining our team.\n\n\
             Best regards,\n\
             Recruitment Team\n",
            title = self.job_title
        )
    }
}

/// Notification failure. Never rolls back the status change that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("notification sender is not configured")]
    NotConfigured,
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("notification timed out after {0:?}")]
    TimedOut(Duration),
}

/// What happened to a requested shortlist notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    NotRequested,
    Sent,
    Skipped { reason: String },
    Failed { reason: String },
}

impl NotificationOutcome {
    pub fn was_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent)
    }
}

/// Dispatcher used when no sender has been configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledDispatcher;

#[async_trait]
impl NotificationDispatcher for DisabledDispatcher {
    async fn dispatch(&self, notice: ShortlistNotice) -> Result<(), DispatchError> {
        tracing::warn!(
            recipient = %notice.candidate_email,
            "notification credentials not configured; skipping shortlist e-mail"
        );
        Err(DispatchError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_renders_subject_and_greeting() {
        let notice = ShortlistNotice {
            candidate_name: None,
            candidate_email: "jo@example.com".to_string(),
            job_title: "Platform Engineer".to_string(),
        };

        assert_eq!(
            notice.subject(),
            "Congratulations! You've been shortlisted for Platform Engineer"
        );
        assert!(notice.body().starts_with("Dear Candidate,"));
        assert!(notice.body().contains("the position of Platform Engineer."));
    }

    #[tokio::test]
    async fn disabled_dispatcher_reports_not_configured() {
        let notice = ShortlistNotice {
            candidate_name: Some("Jo".to_string()),
            candidate_email: "jo@example.com".to_string(),
            job_title: "Analyst".to_string(),
        };
        assert_eq!(
            DisabledDispatcher.dispatch(notice).await,
            Err(DispatchError::NotConfigured)
        );
    }
}
