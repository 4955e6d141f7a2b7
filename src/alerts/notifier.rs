//! Email delivery for warnings

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::message::WarningMessage;
use crate::config::EmailConfig;

/// Sends warning emails through an authenticated STARTTLS relay
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the warning through the configured relay, logging instead of
    /// returning any failure
    ///
    /// Returns whether the relay accepted the message.
    pub async fn notify(&self, warning: &WarningMessage) -> bool {
        match self.relay() {
            Ok(relay) => self.notify_via(&relay, warning).await,
            Err(e) => {
                tracing::error!(
                    relay = %self.config.smtp_host,
                    error = %e,
                    "Error setting up connection"
                );
                false
            }
        }
    }

    /// Send the warning over `transport`, logging instead of returning any
    /// failure
    pub async fn notify_via<T>(&self, transport: &T, warning: &WarningMessage) -> bool
    where
        T: AsyncTransport + Sync,
        T::Error: std::fmt::Display,
    {
        match self.send_via(transport, warning).await {
            Ok(()) => {
                tracing::info!("Warning email has been sent");
                true
            }
            Err(e) => {
                tracing::error!(
                    relay = %self.config.smtp_host,
                    error = %e,
                    "Email did not reach recipient"
                );
                false
            }
        }
    }

    /// Send the warning through the configured relay
    pub async fn send(&self, warning: &WarningMessage) -> Result<(), NotifierError> {
        let relay = self.relay()?;
        self.send_via(&relay, warning).await
    }

    /// Send the warning to every configured recipient over `transport`
    pub async fn send_via<T>(&self, transport: &T, warning: &WarningMessage) -> Result<(), NotifierError>
    where
        T: AsyncTransport + Sync,
        T::Error: std::fmt::Display,
    {
        let email = self.build_message(warning)?;
        transport
            .send(email)
            .await
            .map_err(|e| NotifierError::Delivery(e.to_string()))?;
        Ok(())
    }

    /// STARTTLS transport to the configured relay, authenticated as the sender
    pub fn relay(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifierError> {
        let relay = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.sender.clone(),
                self.config.password.clone(),
            ))
            .build();
        Ok(relay)
    }

    /// Assemble the plain-text message with one `To` mailbox per recipient
    pub fn build_message(&self, warning: &WarningMessage) -> Result<Message, NotifierError> {
        let recipients = self.config.recipients();
        if recipients.is_empty() {
            return Err(NotifierError::NoRecipients);
        }
        tracing::info!(recipients = ?recipients, "Recipients");

        let mut builder = Message::builder()
            .from(self.config.sender.parse::<Mailbox>()?)
            .subject(self.config.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        builder
            .body(warning.body().to_string())
            .map_err(|e| NotifierError::Build(e.to_string()))
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("No recipients configured")]
    NoRecipients,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Thresholds;
    use chrono::{TimeZone, Utc};
    use lettre::transport::stub::AsyncStubTransport;

    fn email_config() -> EmailConfig {
        EmailConfig {
            sender: "monitor@example.com".to_string(),
            password: "app-password".to_string(),
            recipient: "ops@example.com, oncall@example.com".to_string(),
            subject: "Sensor warning".to_string(),
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: 1,
        }
    }

    fn warning() -> WarningMessage {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        WarningMessage::build(&[0], &[5.0], "C", &at, &Thresholds::new(10.0, 90.0)).unwrap()
    }

    #[test]
    fn test_build_message_headers() {
        let notifier = EmailNotifier::new(email_config());
        let message = notifier.build_message(&warning()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: monitor@example.com"));
        assert!(raw.contains("ops@example.com"));
        assert!(raw.contains("oncall@example.com"));
        assert!(raw.contains("Subject: Sensor warning"));
        assert_eq!(message.envelope().to().len(), 2);
    }

    #[test]
    fn test_build_message_bad_sender() {
        let mut config = email_config();
        config.sender = "not-an-email".to_string();
        let notifier = EmailNotifier::new(config);

        let err = notifier.build_message(&warning()).unwrap_err();
        assert!(matches!(err, NotifierError::Address(_)));
    }

    #[test]
    fn test_build_message_no_recipients() {
        let mut config = email_config();
        config.recipient = " ".to_string();
        let notifier = EmailNotifier::new(config);

        let err = notifier.build_message(&warning()).unwrap_err();
        assert!(matches!(err, NotifierError::NoRecipients));
    }

    #[tokio::test]
    async fn test_send_via_delivers_to_all_recipients() {
        let notifier = EmailNotifier::new(email_config());
        let transport = AsyncStubTransport::new_ok();

        notifier.send_via(&transport, &warning()).await.unwrap();

        let sent = transport.messages().await;
        assert_eq!(sent.len(), 1);
        let (envelope, raw) = &sent[0];
        assert_eq!(envelope.to().len(), 2);
        assert!(raw.contains("Failures detected with values: 5C"));
    }

    #[tokio::test]
    async fn test_notify_via_reports_success() {
        let notifier = EmailNotifier::new(email_config());
        assert!(notifier.notify_via(&AsyncStubTransport::new_ok(), &warning()).await);
    }

    #[tokio::test]
    async fn test_notify_via_swallows_rejection() {
        let notifier = EmailNotifier::new(email_config());
        assert!(!notifier.notify_via(&AsyncStubTransport::new_error(), &warning()).await);
    }

    #[tokio::test]
    async fn test_notify_swallows_delivery_failure() {
        let notifier = EmailNotifier::new(email_config());
        assert!(!notifier.notify(&warning()).await);
    }

    #[tokio::test]
    async fn test_send_unreachable_relay_is_error() {
        let notifier = EmailNotifier::new(email_config());
        let err = notifier.send(&warning()).await.unwrap_err();
        assert!(matches!(
            err,
            NotifierError::Delivery(_) | NotifierError::Transport(_)
        ));
    }
}
