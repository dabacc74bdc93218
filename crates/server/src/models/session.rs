//! Session-stored types and keys.

use ridepool_core::UserId;
use serde::{Deserialize, Serialize};

/// Session storage keys.
pub mod session_keys {
    /// Key under which the authenticated user is stored.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user, as stored in the tower-session after a successful
/// login exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    /// Normalized E.164 phone the session was established from.
    pub phone: String,
    pub name: Option<String>,
}

impl CurrentUser {
    #[must_use]
    pub const fn new(id: UserId, phone: String, name: Option<String>) -> Self {
        Self { id, phone, name }
    }
}
