//! Shared test utilities for the notifier crates
//!
//! - `TestDatabase`: PostgreSQL container with a `users` table (feature: "postgres")
//! - `TestRabbitMq`: RabbitMQ container (feature: "rabbitmq")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//!
//! # Features
//!
//! - `postgres` (default): Enables PostgreSQL test infrastructure
//! - `rabbitmq`: Enables RabbitMQ test infrastructure
//! - `all`: Enables everything
//!
//! Container-backed tests need Docker; mark them `#[ignore]`.
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestRabbitMq};
//!
//! #[tokio::test]
//! #[ignore]
//! async fn my_broker_test() {
//!     let rabbit = TestRabbitMq::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_broker_test");
//!     let queue = builder.queue_name("primary");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "rabbitmq")]
mod rabbitmq;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "rabbitmq")]
pub use rabbitmq::TestRabbitMq;

use uuid::Uuid;

/// Builder for test data with deterministic randomization
///
/// Two builders with the same seed produce the same data, so failures reproduce.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_email_retry");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic user id for recipient `index`
    pub fn user_id(&self, index: u32) -> String {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..12].copy_from_slice(&index.to_le_bytes());
        Uuid::from_bytes(bytes).to_string()
    }

    /// `count` distinct user ids
    pub fn user_ids(&self, count: u32) -> Vec<String> {
        (0..count).map(|i| self.user_id(i)).collect()
    }

    /// Email address for recipient `index`
    pub fn email(&self, index: u32) -> String {
        format!("user-{}-{}@example.com", self.seed % 100_000, index)
    }

    /// E.164 phone number for recipient `index`
    pub fn phone(&self, index: u32) -> String {
        format!("+1555{:03}{:04}", self.seed % 1000, index % 10_000)
    }

    /// Unique broker entity name, e.g. `test-notifications-12345-dlq`
    pub fn queue_name(&self, suffix: &str) -> String {
        format!("test-notifications-{}-{}", self.seed, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.user_ids(3), builder2.user_ids(3));
        assert_eq!(builder1.queue_name("dlq"), builder2.queue_name("dlq"));
    }

    #[test]
    fn test_user_ids_are_distinct() {
        let ids = TestDataBuilder::from_test_name("ids").user_ids(5);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.user_id(0), builder2.user_id(0));
    }

    #[test]
    fn test_contact_formats() {
        let builder = TestDataBuilder::new(7);
        assert!(builder.email(1).ends_with("@example.com"));
        assert!(builder.phone(1).starts_with("+1555"));
        assert_eq!(builder.phone(1).len(), 12);
    }
}
