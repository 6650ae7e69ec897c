use crate::errors::StoreError;
use crate::utils::datetime::timestamp_now;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Why a registration stopped being active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// The user pressed "Remove"
    UserManually,
    /// The reopening notification was delivered
    Notified,
}

impl RemovalReason {
    /// Stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalReason::UserManually => "UserManually",
            RemovalReason::Notified => "Notified",
        }
    }
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's interest in being told when a restaurant reopens.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub user_id: i64,
    pub slug: String,
    pub registered_at: String,
    pub removed_at: Option<String>,
    pub removed_reason: Option<String>,
    pub active: bool,
}

/// The `(user, restaurant)` pair of an active registration.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ActiveRegistration {
    pub user_id: i64,
    pub slug: String,
}

impl Registration {
    /// Registers `user_id` for `slug`. Returns the new id, or `None` when the
    /// user already has an active registration for that restaurant.
    ///
    /// The partial unique index on active pairs makes the check and the
    /// insert one atomic statement, across connections and processes.
    pub async fn add(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        slug: &str,
    ) -> Result<Option<String>, StoreError> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            "INSERT INTO registrations (id, user_id, slug, registered_at, active)
             VALUES (?, ?, ?, ?, 1)
             ON CONFLICT DO NOTHING",
        )
        .bind(&id)
        .bind(user_id)
        .bind(slug)
        .bind(timestamp_now())
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(id))
    }

    /// Retires the active registration for the pair. Returns the number of
    /// rows changed: 0 when there was nothing active, otherwise 1.
    pub async fn remove(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        slug: &str,
        reason: RemovalReason,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE registrations
             SET removed_at = ?, removed_reason = ?, active = 0
             WHERE user_id = ? AND slug = ? AND active = 1",
        )
        .bind(timestamp_now())
        .bind(reason.as_str())
        .bind(user_id)
        .bind(slug)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Slugs the user is currently waiting on.
    pub async fn list_active_for_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<String>, StoreError> {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM registrations
             WHERE user_id = ? AND active = 1
             GROUP BY slug
             ORDER BY MIN(registered_at)",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(slugs)
    }

    /// Every active registration in the system.
    pub async fn list_all_active(
        pool: &sqlx::SqlitePool,
    ) -> Result<Vec<ActiveRegistration>, StoreError> {
        let rows = sqlx::query_as::<_, ActiveRegistration>(
            "SELECT user_id, slug FROM registrations WHERE active = 1",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Full history for a user, newest first.
    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, StoreError> {
        let rows = sqlx::query_as::<_, Registration>(
            "SELECT id, user_id, slug, registered_at, removed_at, removed_reason, active
             FROM registrations
             WHERE user_id = ?
             ORDER BY registered_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Number of active registrations.
    pub async fn count_active(pool: &sqlx::SqlitePool) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE active = 1",
        )
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Parsed removal reason, if retired.
    pub fn reason(&self) -> Option<RemovalReason> {
        match self.removed_reason.as_deref() {
            Some("UserManually") => Some(RemovalReason::UserManually),
            Some("Notified") => Some(RemovalReason::Notified),
            _ => None,
        }
    }
}
