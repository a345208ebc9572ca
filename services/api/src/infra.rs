use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talent_match::config::{ConfigError, NotificationConfig, SmtpConfig};
use talent_match::workflows::recruitment::{
    DisabledDispatcher, DispatchError, NotificationDispatcher, ShortlistNotice,
};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Delivers shortlist e-mail through an SMTP relay.
pub(crate) struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpDispatcher {
    pub(crate) fn new(sender: &str, smtp: &SmtpConfig) -> Result<Self, ConfigError> {
        let from = sender.parse::<Mailbox>().map_err(|err| {
            ConfigError::InvalidNotification(format!("invalid sender address '{sender}': {err}"))
        })?;

        let builder = if smtp.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host).map_err(|err| {
                ConfigError::InvalidNotification(format!(
                    "cannot configure relay {}: {err}",
                    smtp.host
                ))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
        }
        .port(smtp.port);

        let builder = match (&smtp.username, &smtp.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpDispatcher {
    async fn dispatch(&self, notice: ShortlistNotice) -> Result<(), DispatchError> {
        let to = notice.candidate_email.parse::<Mailbox>().map_err(|err| {
            DispatchError::Transport(format!(
                "invalid recipient address '{}': {err}",
                notice.candidate_email
            ))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notice.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body())
            .map_err(|err| DispatchError::Transport(format!("cannot build message: {err}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        info!(recipient = %notice.candidate_email, job_title = %notice.job_title, "shortlist e-mail sent");
        Ok(())
    }
}

/// Rendered shortlist e-mail kept by the demo outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutboundEmail {
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

/// Records rendered shortlist e-mails in memory so the demo can print them.
#[derive(Clone)]
pub(crate) struct InMemoryOutbox {
    sender: String,
    messages: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl InMemoryOutbox {
    pub(crate) fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn messages(&self) -> Vec<OutboundEmail> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryOutbox {
    async fn dispatch(&self, notice: ShortlistNotice) -> Result<(), DispatchError> {
        let email = OutboundEmail {
            from: self.sender.clone(),
            to: notice.candidate_email.clone(),
            subject: notice.subject(),
            body: notice.body(),
        };
        let mut guard = self
            .messages
            .lock()
            .map_err(|_| DispatchError::Transport("outbox lock poisoned".to_string()))?;
        guard.push(email);
        Ok(())
    }
}

/// SMTP delivery when both a relay and a sender are configured, otherwise disabled.
pub(crate) fn dispatcher_for(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationDispatcher>, ConfigError> {
    match (&config.smtp, &config.sender) {
        (Some(smtp), Some(sender)) => {
            info!(relay = %smtp.host, port = smtp.port, %sender, "shortlist e-mail delivery via SMTP");
            Ok(Arc::new(SmtpDispatcher::new(sender, smtp)?))
        }
        (Some(smtp), None) => {
            warn!(relay = %smtp.host, "SMTP relay configured without a sender; shortlist e-mail disabled");
            Ok(Arc::new(DisabledDispatcher))
        }
        (None, _) => Ok(Arc::new(DisabledDispatcher)),
    }
}
