pub mod templates;

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, TlsMode};

/// A rendered email, addressed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Delivers rendered mail to the configured recipient list.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), String>;
}

/// SMTP delivery through one pooled transport built at start-up.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl SmtpMailer {
    pub fn new(
        config: &SmtpConfig,
        recipients: &[String],
        timeout: Duration,
    ) -> Result<Self, String> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| format!("Invalid from address: {e}"))?;

        if recipients.is_empty() {
            return Err("No recipients configured".to_string());
        }
        let recipients = recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>()
                    .map_err(|e| format!("Invalid recipient address '{r}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transport: build_smtp_transport(config, timeout)?,
            from,
            recipients,
        })
    }

    pub fn recipients(&self) -> &[Mailbox] {
        &self.recipients
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), String> {
        let mut builder = Message::builder().from(self.from.clone());
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        let message = builder
            .subject(mail.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

pub fn build_smtp_transport(
    config: &SmtpConfig,
    timeout: Duration,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let transport = match config.tls {
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?,
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP starttls error: {e}"))?,
        TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
    };

    Ok(transport
        .port(config.port)
        .credentials(creds)
        .timeout(Some(timeout))
        .build())
}
