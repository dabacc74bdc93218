//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::sms::SmsError;

/// Errors that can occur during OTP authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Phone number missing or malformed.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] ridepool_core::PhoneError),

    /// Too many codes issued for this phone in the trailing window.
    #[error("too many OTP requests")]
    RateLimited,

    /// No matching unexpired code for (phone, code).
    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    /// SMS dispatch failure. The issued code row survives this error so the
    /// user can retry by requesting a resend.
    #[error("SMS delivery failed: {0}")]
    Sms(#[from] SmsError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
