//! Environment-driven configuration shared by the notifier crates.
//!
//! - `Environment`: development vs production (log format, filters)
//! - `FromEnv`: load a config value from environment variables
//! - `env_*` helpers for required, defaulted and parsed variables
//! - `tracing`: subscriber and color-eyre bootstrap

pub mod server;
pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Environment variable '{0}' must not be empty")]
    EmptyEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Like `env_required`, but a blank value is also an error
pub fn env_non_empty(key: &str) -> Result<String, ConfigError> {
    let value = env_required(key)?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyEnvVar(key.to_string()));
    }
    Ok(value)
}

/// Parse an optional variable. Unset yields `None`; an unparseable value is an error.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::ParseError {
                key: key.to_string(),
                details: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Parse a variable, falling back to `default` when unset or unparseable
pub fn env_parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("NOTIFIER_TEST_VAR", Some("value"), || {
            assert_eq!(env_or_default("NOTIFIER_TEST_VAR", "default"), "value");
        });

        temp_env::with_var_unset("NOTIFIER_TEST_VAR", || {
            assert_eq!(env_or_default("NOTIFIER_TEST_VAR", "default"), "default");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("MISSING_REQUIRED", || {
            let err = env_required("MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_non_empty() {
        temp_env::with_var("QUEUE_NAME", Some("   "), || {
            let err = env_non_empty("QUEUE_NAME").unwrap_err();
            assert!(matches!(err, ConfigError::EmptyEnvVar(_)));
        });

        temp_env::with_var("QUEUE_NAME", Some("notifications"), || {
            assert_eq!(env_non_empty("QUEUE_NAME").unwrap(), "notifications");
        });
    }

    #[test]
    fn test_env_parse() {
        temp_env::with_var("WORKERS", Some("8"), || {
            assert_eq!(env_parse::<usize>("WORKERS").unwrap(), Some(8));
        });

        temp_env::with_var_unset("WORKERS", || {
            assert_eq!(env_parse::<usize>("WORKERS").unwrap(), None);
        });

        temp_env::with_var("WORKERS", Some("many"), || {
            let err = env_parse::<usize>("WORKERS").unwrap_err();
            assert!(err.to_string().contains("WORKERS"));
        });
    }

    #[test]
    fn test_env_parse_or_falls_back() {
        temp_env::with_var("RETRIES", Some("-1"), || {
            assert_eq!(env_parse_or::<u32>("RETRIES", 3), 3);
        });

        temp_env::with_var("RETRIES", Some("5"), || {
            assert_eq!(env_parse_or::<u32>("RETRIES", 3), 5);
        });
    }
}
