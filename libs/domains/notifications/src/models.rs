//! Data models for the notifications domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery channel of a notification.
///
/// Any string decodes; names without a processor become `Unsupported` so that
/// type validity is decided at dispatch rather than while decoding.
///
/// `Unsupported` can only be built through `From`, so it never holds a name
/// that `Email` or `Sms` already claims and every value encodes back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    Email,
    Sms,
    Unsupported(UnknownTypeName),
}

/// Type name with no shipped processor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownTypeName(String);

impl UnknownTypeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::Email => "email",
            NotificationType::Sms => "sms",
            NotificationType::Unsupported(name) => name.as_str(),
        }
    }

    /// Whether a processor ships for this type
    pub fn is_supported(&self) -> bool {
        !matches!(self, NotificationType::Unsupported(_))
    }
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "email" => NotificationType::Email,
            "sms" => NotificationType::Sms,
            _ => NotificationType::Unsupported(UnknownTypeName(value)),
        }
    }
}

impl From<&str> for NotificationType {
    fn from(value: &str) -> Self {
        NotificationType::from(value.to_string())
    }
}

impl From<NotificationType> for String {
    fn from(value: NotificationType) -> Self {
        match value {
            NotificationType::Unsupported(name) => name.0,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as accepted from producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Delivery channel.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Recipient user ids, resolved through the user directory.
    pub to: Vec<String>,
    /// Sender identity (address or phone number depending on the channel).
    pub from: String,
    pub subject: String,
    pub content: String,
}

impl Notification {
    pub fn new(
        kind: NotificationType,
        to: Vec<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            to,
            from: from.into(),
            subject: subject.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(NotificationType::from("email"), NotificationType::Email);
        assert_eq!(NotificationType::from("sms"), NotificationType::Sms);
        assert!(matches!(
            NotificationType::from("fax"),
            NotificationType::Unsupported(name) if name.as_str() == "fax"
        ));
        assert_eq!(NotificationType::Sms.to_string(), "sms");
        assert!(!NotificationType::from("Email").is_supported());
    }

    #[test]
    fn test_notification_wire_shape() {
        let notification = Notification::new(
            NotificationType::Email,
            vec!["u1".into(), "u2".into()],
            "noreply@example.com",
            "Hello",
            "Body",
        );

        assert_eq!(
            serde_json::to_value(&notification).unwrap(),
            json!({
                "type": "email",
                "to": ["u1", "u2"],
                "from": "noreply@example.com",
                "subject": "Hello",
                "content": "Body"
            })
        );
    }

    #[test]
    fn test_unknown_type_decodes() {
        let notification: Notification = serde_json::from_value(json!({
            "type": "fax",
            "to": ["u1"],
            "from": "x",
            "subject": "s",
            "content": "c"
        }))
        .unwrap();

        assert_eq!(notification.kind.as_str(), "fax");
        assert!(!notification.kind.is_supported());
    }

    #[test]
    fn test_every_type_encodes_back_to_itself() {
        for name in ["email", "sms", "fax", "Email", ""] {
            let kind = NotificationType::from(name);
            let decoded: NotificationType =
                serde_json::from_value(serde_json::to_value(&kind).unwrap()).unwrap();
            assert_eq!(decoded, kind, "type name {:?}", name);
        }
    }
}
