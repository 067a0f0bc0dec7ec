use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::email::templates;
use crate::email::MailTransport;
use crate::error::{AppError, DeliveryStage};
use crate::models::Submission;
use crate::records::{self, Appended, RecordStore};

/// What happened to a submission that made it through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Forwarded {
    Emailed,
    EmailedAndRecorded(Appended),
}

impl Forwarded {
    pub fn client_message(&self) -> &'static str {
        match self {
            Forwarded::Emailed => "Email sent successfully",
            Forwarded::EmailedAndRecorded(_) => "Email sent and records updated successfully",
        }
    }
}

/// Sends a validated submission out: email first, then the sheet row.
/// Nothing is retried and nothing is deduplicated; the same form sent twice
/// is two enquiries.
pub struct Forwarder {
    mailer: Arc<dyn MailTransport>,
    records: Option<Arc<dyn RecordStore>>,
    status: String,
    emailed: AtomicBool,
}

impl Forwarder {
    pub fn new(
        mailer: Arc<dyn MailTransport>,
        records: Option<Arc<dyn RecordStore>>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            records,
            status: status.into(),
            emailed: AtomicBool::new(false),
        }
    }

    /// Stage to blame when `forward` does not run to completion.
    pub fn unfinished_stage(&self) -> DeliveryStage {
        if self.emailed.load(Ordering::Acquire) {
            DeliveryStage::Records
        } else {
            DeliveryStage::Email
        }
    }

    pub async fn forward(
        &self,
        reference: Uuid,
        submission: &Submission,
    ) -> Result<Forwarded, AppError> {
        let mail = templates::render_enquiry(submission);
        self.mailer
            .send(&mail)
            .await
            .map_err(|e| AppError::Delivery(DeliveryStage::Email, format!("[{reference}] {e}")))?;
        self.emailed.store(true, Ordering::Release);
        tracing::info!("[{reference}] Enquiry email sent");

        let Some(store) = &self.records else {
            return Ok(Forwarded::Emailed);
        };

        let appended = records::append(store.as_ref(), submission, &self.status)
            .await
            .map_err(|e| AppError::Delivery(DeliveryStage::Records, format!("[{reference}] {e}")))?;
        tracing::info!(
            "[{reference}] Lead recorded as serial {} in row {}",
            appended.serial,
            appended.row
        );

        Ok(Forwarded::EmailedAndRecorded(appended))
    }
}
