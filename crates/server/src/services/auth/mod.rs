//! Phone-OTP authentication service.
//!
//! Three operations, all keyed by a normalized E.164 phone:
//!
//! 1. `send_otp` - rate-limit, generate, replace prior unverified codes,
//!    store, dispatch via SMS.
//! 2. `verify_otp` - consume the newest matching unverified code and resolve
//!    (or create) the identity. No session is minted here.
//! 3. `login` - the session exchange: re-validate a *verified* unexpired
//!    code, then delete every code for the phone before the caller stores
//!    the user in the session.

mod error;

pub use error::AuthError;

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;

use ridepool_core::Phone;

use crate::db::otps::OtpRepository;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::sms::SmsClient;

/// Code lifetime.
const OTP_TTL_MINUTES: i64 = 5;
/// Trailing rate-limit window.
const RATE_LIMIT_WINDOW_MINUTES: i64 = 10;
/// Maximum codes issued per phone inside the window.
const MAX_CODES_PER_WINDOW: i64 = 5;

/// Outcome of a successful OTP verification.
#[derive(Debug)]
pub struct VerifiedIdentity {
    /// The resolved (possibly freshly created) user.
    pub user: User,
    /// Whether the user was created by this verification.
    pub is_new_user: bool,
    /// The normalized phone the code was issued for.
    pub phone: Phone,
}

/// Authentication service.
pub struct AuthService<'a> {
    otps: OtpRepository<'a>,
    users: UserRepository<'a>,
    sms: &'a SmsClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, sms: &'a SmsClient) -> Self {
        Self {
            otps: OtpRepository::new(pool),
            users: UserRepository::new(pool),
            sms,
        }
    }

    /// Issue and dispatch a one-time code for a phone number.
    ///
    /// Returns the normalized phone on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` if the phone is missing/malformed.
    /// Returns `AuthError::RateLimited` after 5 codes in 10 minutes.
    /// Returns `AuthError::Sms` if dispatch fails. The stored code survives
    /// this error, so a partially delivered code stays usable on resend.
    pub async fn send_otp(&self, phone: &str) -> Result<Phone, AuthError> {
        let phone = Phone::parse(phone)?;

        // Sliding window: count codes issued in the trailing 10 minutes.
        let cutoff = Utc::now() - Duration::minutes(RATE_LIMIT_WINDOW_MINUTES);
        let recent = self.otps.count_since(&phone, cutoff).await?;
        if recent >= MAX_CODES_PER_WINDOW {
            tracing::info!(phone = %phone, recent, "OTP rate limit hit");
            return Err(AuthError::RateLimited);
        }

        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        // Only one live code per phone: prior unverified codes are replaced.
        self.otps.delete_unverified(&phone).await?;
        self.otps.create(&phone, &code, expires_at).await?;

        let body = format!(
            "Your Ridepool verification code is: {code}. \
             Valid for {OTP_TTL_MINUTES} minutes. Do not share this with anyone."
        );
        self.sms.send(&phone, &body).await?;

        tracing::debug!(phone = %phone, "OTP dispatched");
        Ok(phone)
    }

    /// Verify a submitted code and resolve the identity behind the phone.
    ///
    /// Consumes the code (sets `verified = true`), so a second call with the
    /// same pair fails. Safe to retry on failure: nothing is mutated unless
    /// a code matches.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOrExpiredCode` if no unverified, unexpired
    /// code matches.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<VerifiedIdentity, AuthError> {
        let phone = Phone::parse(phone)?;

        let otp = self
            .otps
            .find_matching(&phone, code, false)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)?;

        self.otps.mark_verified(otp.id).await?;

        let (user, is_new_user) = match self.users.get_by_phone(&phone).await? {
            Some(user) => {
                self.users.mark_verified(user.id).await?;
                (User { verified: true, ..user }, false)
            }
            None => (self.users.create_from_phone(&phone).await?, true),
        };

        tracing::info!(user_id = %user.id, is_new_user, "phone verified");

        Ok(VerifiedIdentity {
            user,
            is_new_user,
            phone,
        })
    }

    /// The session exchange: re-validate a verified, unexpired code and
    /// return the identity to bind the session to. All codes for the phone
    /// are deleted on success, whether verified or not.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOrExpiredCode` if no verified, unexpired
    /// code matches (i.e. `verify_otp` was never called or the code expired).
    pub async fn login(&self, phone: &str, code: &str) -> Result<User, AuthError> {
        let phone = Phone::parse(phone)?;

        self.otps
            .find_matching(&phone, code, true)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)?;

        let user = match self.users.get_by_phone(&phone).await? {
            Some(user) => user,
            None => self.users.create_from_phone(&phone).await?,
        };

        self.otps.delete_all(&phone).await?;

        tracing::info!(user_id = %user.id, "session exchange complete");
        Ok(user)
    }
}

/// Generate a uniform random 6-digit code.
///
/// `rand::rng()` is CSPRNG-backed, so codes are cryptographically sourced
/// even though they are also rate-limited and short-lived.
fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_code_in_range() {
        for _ in 0..1000 {
            let code: u32 = generate_code().parse().expect("numeric");
            assert!((100_000..=999_999).contains(&code));
        }
    }
}
