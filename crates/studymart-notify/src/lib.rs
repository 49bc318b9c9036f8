//! StudyMart Notifications
//!
//! Delivers the delivery-confirmation OTP to the buyer. The escrow core
//! treats the sender as an opaque collaborator; the default implementation
//! here logs the notification, and tests use the recording sender.

pub mod otp;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use otp::generate_otp;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// A delivery-confirmation notice for the buyer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpNotice {
    /// Buyer contact address (email or phone)
    pub recipient: String,
    /// The one-time code
    pub otp_code: String,
    /// Human-readable order reference
    pub order_reference: String,
}

/// Sends OTP notices to buyers
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_otp(&self, notice: OtpNotice) -> NotifyResult<()>;
}

/// Sender that writes the notice to the log. Used in development where no
/// messaging credentials are configured.
#[derive(Default)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send_otp(&self, notice: OtpNotice) -> NotifyResult<()> {
        info!(
            recipient = %notice.recipient,
            order = %notice.order_reference,
            "Delivery OTP issued"
        );
        Ok(())
    }
}

/// Recording sender for tests
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OtpNotice>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OtpNotice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send_otp(&self, notice: OtpNotice) -> NotifyResult<()> {
        self.sent.lock().unwrap().push(notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sender() {
        let sender = RecordingSender::new();
        sender
            .send_otp(OtpNotice {
                recipient: "buyer@example.edu".to_string(),
                otp_code: "123456".to_string(),
                order_reference: "SM-42".to_string(),
            })
            .await
            .unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].otp_code, "123456");
    }
}
