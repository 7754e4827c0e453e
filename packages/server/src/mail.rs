use async_trait::async_trait;

/// Errors raised by a mail transport.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Outbound e-mail seam.
///
/// The production transport is deployment-specific; the server only depends
/// on this trait, so swapping in an SMTP- or API-backed implementation is a
/// matter of wiring a different `Arc<dyn Mailer>` into the app state.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Development transport that writes outgoing mail to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, subject = %subject, "outgoing email: {}", body);
        Ok(())
    }
}
