use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::repository::MailPort;
use crate::error::AccountError;

/// SMTP-backed mail capability. Everything beyond "the transport accepted
/// the message" (retries, templating, bounces) belongs to the mail provider.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp_url: &str, from: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(smtp_url)
            .context("invalid SMTP_URL")?
            .build();
        let from = from.parse::<Mailbox>().context("invalid MAIL_FROM")?;
        Ok(Self { transport, from })
    }
}

impl MailPort for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AccountError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|_| AccountError::DeliveryFailed)?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_owned())
            .map_err(|e| AccountError::Internal(anyhow::anyhow!("build message: {e}")))?;

        let response = self.transport.send(message).await.map_err(|e| {
            tracing::error!(error = %e, "smtp send failed");
            AccountError::DeliveryFailed
        })?;
        if !response.is_positive() {
            return Err(AccountError::DeliveryFailed);
        }
        Ok(())
    }
}
