//! User domain types.

use chrono::{DateTime, Utc};
use ridepool_core::{Phone, UserId};
use serde::Serialize;

/// A registered user (domain type).
///
/// Created lazily on first successful phone verification. The email is a
/// synthesized placeholder (`{digits}@ridepool.phone`) until the user sets a
/// real one from their profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Verified phone number, if the account was created via OTP.
    pub phone: Option<Phone>,
    /// Unique email (may be a placeholder synthesized from the phone).
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub image: Option<String>,
    /// Whether the phone has been verified.
    pub verified: bool,
    /// Average review rating.
    pub rating: f64,
    /// Number of rides driven or taken.
    pub total_rides: i32,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The subset of user fields embedded in ride and booking responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub id: UserId,
    pub name: Option<String>,
    pub image: Option<String>,
    pub rating: f64,
    pub total_rides: i32,
    pub verified: bool,
}

/// The passenger fields embedded in a booking confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerSummary {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for PassengerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
