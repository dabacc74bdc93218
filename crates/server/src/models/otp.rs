//! One-time code domain type.

use chrono::{DateTime, Utc};
use ridepool_core::{OtpId, Phone};

/// A one-time verification code issued for a phone number.
///
/// Lifecycle: issued (unverified) -> verified (consumed by identity
/// resolution) -> deleted (consumed by session issuance), or issued ->
/// expired. There is no transition back from verified or deleted.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: OtpId,
    pub phone: Phone,
    /// Six decimal digits.
    pub code: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
