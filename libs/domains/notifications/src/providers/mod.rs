//! Delivery transports.
//!
//! This module contains the transport traits the processors depend on and
//! their HTTP implementations: Mandrill for email, Twilio for SMS.

mod mandrill;
mod twilio;

pub use mandrill::{MandrillConfig, MandrillTransport};
pub use twilio::{TwilioConfig, TwilioTransport};

use crate::error::NotificationResult;
use async_trait::async_trait;
use serde::Deserialize;

/// A rendered email addressed to every resolved recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub subject: String,
    pub text: String,
    pub recipients: Vec<String>,
}

/// Per-recipient result reported by the email transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipientStatus {
    pub email: String,
    pub status: String,
    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

impl RecipientStatus {
    /// Statuses that fail the whole message
    pub fn is_refused(&self) -> bool {
        matches!(self.status.as_str(), "rejected" | "invalid")
    }
}

/// A single SMS to one phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Identifier assigned to an accepted SMS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmsReceipt {
    pub sid: String,
}

/// Email gateway.
///
/// Errors are returned for transport failures and non-success HTTP statuses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> NotificationResult<Vec<RecipientStatus>>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}

/// SMS gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send_sms(&self, message: &SmsMessage) -> NotificationResult<SmsReceipt>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}
