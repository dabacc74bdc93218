//! Notification domain type.

use chrono::{DateTime, Utc};
use ridepool_core::{NotificationId, UserId};
use serde::Serialize;

/// An in-app notification, created as a side effect of booking events and
/// owned by its recipient. Mutated only by "mark read".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Event category, e.g. "booking".
    pub kind: String,
    pub title: String,
    pub message: String,
    /// Relative link to the subject of the notification.
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
