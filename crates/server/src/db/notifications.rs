//! Notification repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use ridepool_core::{NotificationId, UserId};

use super::RepositoryError;
use crate::models::Notification;

/// Raw `notifications` row.
#[derive(Debug, FromRow)]
struct NotificationRow {
    id: i32,
    user_id: i32,
    kind: String,
    title: String,
    message: String,
    link: Option<String>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind: row.kind,
            title: row.title,
            message: row.message,
            link: row.link,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The recipient's newest notifications, capped at 50.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            "SELECT id, user_id, kind, title, message, link, read, created_at
             FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT 50",
        )
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// Mark all of the recipient's unread notifications as read.
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_all_read(&self, user: UserId) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user.as_i32())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
