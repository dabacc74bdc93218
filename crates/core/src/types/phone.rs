//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Domain used when synthesizing a placeholder email from a phone number.
///
/// Accounts created through phone verification have no email address, but the
/// user table requires a unique one. The placeholder keeps the column NOT NULL
/// UNIQUE without collecting a real address.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "ridepool.phone";

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A phone number in E.164-style form.
///
/// Normalization only prefixes a `+` when one is absent; digit count and
/// country code are not validated. Clients submit raw digits or E.164 and
/// both normalize to the same value, so the phone column stays canonical.
///
/// ## Examples
///
/// ```
/// use ridepool_core::Phone;
///
/// let a = Phone::parse("15551230000").unwrap();
/// let b = Phone::parse("+15551230000").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "+15551230000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum length of a phone number (E.164 allows 15 digits plus `+`,
    /// with headroom for legacy formatting).
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Phone` from a string, prefixing `+` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or longer than 32 characters.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(PhoneError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let normalized = if s.starts_with('+') {
            s.to_owned()
        } else {
            format!("+{s}")
        };

        Ok(Self(normalized))
    }

    /// Get the normalized phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, without the leading `+`.
    #[must_use]
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }

    /// Synthesize the placeholder email used for phone-only accounts,
    /// e.g. `15551230000@ridepool.phone`.
    #[must_use]
    pub fn placeholder_email(&self) -> String {
        format!("{}@{PLACEHOLDER_EMAIL_DOMAIN}", self.digits())
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
