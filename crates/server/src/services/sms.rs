//! SMS delivery via the Twilio Messages API.
//!
//! The core only depends on this narrow client; provider-specific error
//! codes are mapped to typed failures here so callers never see raw Twilio
//! codes.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use ridepool_core::Phone;

use crate::config::TwilioConfig;

/// Twilio error code: invalid 'To' phone number.
const CODE_INVALID_NUMBER: i64 = 21211;
/// Twilio error codes: the number cannot receive SMS from this account.
const CODE_UNDELIVERABLE: [i64; 2] = [21608, 21612];

/// Errors that can occur when dispatching an SMS.
#[derive(Debug, Error)]
pub enum SmsError {
    /// The destination number was rejected by the provider.
    #[error("invalid phone number")]
    InvalidNumber,

    /// The provider cannot deliver to this number.
    #[error("number cannot receive SMS")]
    Undeliverable,

    /// Any other provider-reported failure.
    #[error("SMS provider error {code}: {message}")]
    Provider { code: i64, message: String },

    /// Transport-level failure talking to the provider.
    #[error("SMS transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Error body returned by the Twilio REST API.
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Map a Twilio error code to a typed failure.
fn map_provider_error(code: i64, message: String) -> SmsError {
    if code == CODE_INVALID_NUMBER {
        SmsError::InvalidNumber
    } else if CODE_UNDELIVERABLE.contains(&code) {
        SmsError::Undeliverable
    } else {
        SmsError::Provider { code, message }
    }
}

/// SMS client for sending one-time codes.
#[derive(Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl SmsClient {
    /// Create a new SMS client from configuration.
    #[must_use]
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        }
    }

    /// Send an SMS to the given phone number.
    ///
    /// # Errors
    ///
    /// Returns `SmsError::InvalidNumber` / `SmsError::Undeliverable` for the
    /// provider codes the UI can act on, `SmsError::Provider` for any other
    /// provider failure, and `SmsError::Transport` for HTTP-level failures.
    pub async fn send(&self, to: &Phone, body: &str) -> Result<(), SmsError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("To", to.as_str()),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let error: TwilioErrorBody = response.json().await.unwrap_or(TwilioErrorBody {
            code: None,
            message: None,
        });

        let code = error.code.unwrap_or_else(|| i64::from(status.as_u16()));
        let message = error
            .message
            .unwrap_or_else(|| format!("HTTP {status} from provider"));

        tracing::warn!(code, %message, "SMS dispatch failed");

        Err(map_provider_error(code, message))
    }
}
