//! Twilio SMS transport.

use super::{SmsMessage, SmsReceipt, SmsTransport};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_non_empty, env_or_default};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

const DEFAULT_API_URL: &str = "https://api.twilio.com";

/// Twilio REST API configuration.
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// API base URL (defaults to production).
    pub api_url: String,
}

impl TwilioConfig {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl FromEnv for TwilioConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            account_sid: env_non_empty("TWILIO_ACC_SID")?,
            auth_token: env_non_empty("TWILIO_AUTH_TOKEN")?,
            api_url: env_or_default("TWILIO_API_URL", DEFAULT_API_URL),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// SMS transport creating one Message resource per call.
pub struct TwilioTransport {
    config: TwilioConfig,
    client: Client,
}

impl TwilioTransport {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> NotificationResult<Self> {
        Ok(Self::new(TwilioConfig::from_env()?))
    }
}

#[async_trait]
impl SmsTransport for TwilioTransport {
    async fn send_sms(&self, message: &SmsMessage) -> NotificationResult<SmsReceipt> {
        debug!(to = %message.to, "Sending SMS via Twilio");

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", message.to.as_str()),
                ("From", message.from.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TwilioErrorBody>(&body) {
                Ok(err) => match err.code {
                    Some(code) => format!("{} (code {})", err.message, code),
                    None => err.message,
                },
                Err(_) => body,
            };
            error!(status = %status, error = %detail, "Twilio returned an error status");
            return Err(NotificationError::Transport(format!(
                "Twilio error ({}): {}",
                status, detail
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn name(&self) -> &'static str {
        "twilio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let config = TwilioConfig::new("AC123", "secret").with_api_url("http://localhost:9000/");
        assert_eq!(
            config.messages_url(),
            "http://localhost:9000/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", TwilioConfig::new("AC123", "secret"));
        assert!(rendered.contains("AC123"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_receipt_parses_sid() {
        let receipt: SmsReceipt =
            serde_json::from_str(r#"{"sid": "SM42", "status": "queued", "to": "+15550000000"}"#)
                .unwrap();
        assert_eq!(receipt.sid, "SM42");
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("TWILIO_ACC_SID", Some("AC123")),
                ("TWILIO_AUTH_TOKEN", Some("secret")),
                ("TWILIO_API_URL", None),
            ],
            || {
                let config = TwilioConfig::from_env().unwrap();
                assert_eq!(config.account_sid, "AC123");
                assert_eq!(config.api_url, DEFAULT_API_URL);
            },
        );

        temp_env::with_var_unset("TWILIO_ACC_SID", || {
            assert!(TwilioConfig::from_env().is_err());
        });
    }
}
