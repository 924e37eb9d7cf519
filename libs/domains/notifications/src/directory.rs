//! User directory: resolves recipient ids to contact details.

use crate::error::NotificationResult;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement, Value};
use tracing::debug;

/// Lookup of recipient contacts by user id.
///
/// Unresolvable ids are dropped from the result; only storage failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Email addresses for the given user ids
    async fn emails_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<String>>;

    /// Phone numbers for the given user ids
    async fn phones_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<String>>;
}

#[derive(Debug, FromQueryResult)]
struct ContactRow {
    contact: Option<String>,
}

/// PostgreSQL-backed directory over the `users` table
#[derive(Clone)]
pub struct PgUserDirectory {
    db: DatabaseConnection,
}

impl PgUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn contacts(&self, column: &str, ids: &[String]) -> NotificationResult<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = contact_query(column, ids.len());
        let values: Vec<Value> = ids.iter().map(|id| id.clone().into()).collect();
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let rows = ContactRow::find_by_statement(stmt).all(&self.db).await?;
        let contacts: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.contact)
            .filter(|contact| !contact.trim().is_empty())
            .collect();

        debug!(
            column,
            requested = ids.len(),
            resolved = contacts.len(),
            "Resolved recipient contacts"
        );

        Ok(contacts)
    }
}

/// `SELECT <column> AS contact FROM users WHERE id IN ($1, ..., $n)`
fn contact_query(column: &str, count: usize) -> String {
    let placeholders = (1..=count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} AS contact FROM users WHERE id IN ({})",
        column, placeholders
    )
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn emails_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<String>> {
        self.contacts("email", ids).await
    }

    async fn phones_by_ids(&self, ids: &[String]) -> NotificationResult<Vec<String>> {
        self.contacts("phone_number", ids).await
    }
}
