//! Mandrill (Mailchimp Transactional) email transport.

use super::{EmailMessage, EmailTransport, RecipientStatus};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_non_empty, env_or_default};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

const DEFAULT_API_URL: &str = "https://mandrillapp.com/api/1.0";

/// Mandrill API configuration.
#[derive(Debug, Clone)]
pub struct MandrillConfig {
    pub api_key: String,
    /// API base URL (defaults to production).
    pub api_url: String,
}

impl MandrillConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl FromEnv for MandrillConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_non_empty("MAILCHIMP_API_KEY")?,
            api_url: env_or_default("MANDRILL_API_URL", DEFAULT_API_URL),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    key: &'a str,
    message: MessagePayload<'a>,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    from_email: &'a str,
    subject: &'a str,
    text: &'a str,
    to: Vec<Recipient<'a>>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Email transport posting to `messages/send`.
pub struct MandrillTransport {
    config: MandrillConfig,
    client: Client,
}

impl MandrillTransport {
    pub fn new(config: MandrillConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> NotificationResult<Self> {
        Ok(Self::new(MandrillConfig::from_env()?))
    }

    fn request<'a>(&'a self, message: &'a EmailMessage) -> SendRequest<'a> {
        SendRequest {
            key: &self.config.api_key,
            message: MessagePayload {
                from_email: &message.from,
                subject: &message.subject,
                text: &message.text,
                to: message
                    .recipients
                    .iter()
                    .map(|email| Recipient { email, kind: "to" })
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl EmailTransport for MandrillTransport {
    async fn send_email(&self, message: &EmailMessage) -> NotificationResult<Vec<RecipientStatus>> {
        debug!(
            recipients = message.recipients.len(),
            subject = %message.subject,
            "Sending email via Mandrill"
        );

        let response = self
            .client
            .post(format!(
                "{}/messages/send",
                self.config.api_url.trim_end_matches('/')
            ))
            .json(&self.request(message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, error = %body, "Mandrill returned an error status");
            return Err(NotificationError::Transport(format!(
                "Mandrill error ({}): {}",
                status, body
            )));
        }

        parse_statuses(&body)
    }

    fn name(&self) -> &'static str {
        "mandrill"
    }
}

fn parse_statuses(body: &str) -> NotificationResult<Vec<RecipientStatus>> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_payload_shape() {
        let transport = MandrillTransport::new(MandrillConfig::new("md-key"));
        let message = EmailMessage {
            from: "noreply@example.com".into(),
            subject: "Hi".into(),
            text: "Hello there".into(),
            recipients: vec!["a@example.com".into(), "b@example.com".into()],
        };

        assert_eq!(
            serde_json::to_value(transport.request(&message)).unwrap(),
            json!({
                "key": "md-key",
                "message": {
                    "from_email": "noreply@example.com",
                    "subject": "Hi",
                    "text": "Hello there",
                    "to": [
                        {"email": "a@example.com", "type": "to"},
                        {"email": "b@example.com", "type": "to"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_parse_statuses() {
        let body = r#"[
            {"email": "a@example.com", "status": "sent", "reject_reason": null, "_id": "abc"},
            {"email": "b@example.com", "status": "rejected", "reject_reason": "hard-bounce", "_id": "def"}
        ]"#;

        let statuses = parse_statuses(body).unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(!statuses[0].is_refused());
        assert!(statuses[1].is_refused());
        assert_eq!(statuses[1].reject_reason.as_deref(), Some("hard-bounce"));
        assert_eq!(statuses[0].id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_unexpected_body_fails_closed() {
        let result = parse_statuses(r#"{"status": "error", "message": "Invalid API key"}"#);
        assert!(matches!(result, Err(NotificationError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("MAILCHIMP_API_KEY", Some("md-key")),
                ("MANDRILL_API_URL", None::<&str>),
            ],
            || {
                let config = MandrillConfig::from_env().unwrap();
                assert_eq!(config.api_key, "md-key");
                assert_eq!(config.api_url, DEFAULT_API_URL);
            },
        );
    }

    #[test]
    fn test_config_requires_key() {
        temp_env::with_var("MAILCHIMP_API_KEY", Some(""), || {
            assert!(MandrillConfig::from_env().is_err());
        });
    }
}
