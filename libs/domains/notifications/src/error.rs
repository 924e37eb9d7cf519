//! Error types for the notifications domain.

use core_config::ConfigError;
use queue_worker::QueueError;
use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in the notifications domain.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// None of the recipient ids resolved to a contact.
    #[error("No valid {0} recipients resolved")]
    NoRecipients(&'static str),

    /// User directory lookup failed.
    #[error("User directory error: {0}")]
    Directory(String),

    /// Delivery transport could not be reached or answered with an error status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Transport accepted the request but refused a recipient.
    #[error("Recipient {email} {status}: {reason}")]
    RecipientRejected {
        email: String,
        status: String,
        reason: String,
    },

    /// Transport response could not be interpreted.
    #[error("Unexpected transport response: {0}")]
    UnexpectedResponse(String),

    /// Notification type has no processor.
    #[error("Unsupported notification type: {0}")]
    UnsupportedType(String),

    /// Notification has no recipients.
    #[error("Notification has no recipients")]
    EmptyRecipients,

    /// Broker error while enqueueing.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Directory(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::UnexpectedResponse(err.to_string())
    }
}
