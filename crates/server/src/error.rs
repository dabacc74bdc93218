//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Responses are JSON of the form `{"error": "..."}`
//! and never leak internal detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::bookings::BookingError;
use crate::services::sms::SmsError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Booking operation failed.
    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server-side fault worth capturing.
    fn is_internal(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Auth(AuthError::Repository(_)) => true,
            Self::Auth(AuthError::Sms(err)) => {
                !matches!(err, SmsError::InvalidNumber | SmsError::Undeliverable)
            }
            Self::Booking(BookingError::Repository(_)) => true,
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidPhone(_) | AuthError::InvalidOrExpiredCode => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                AuthError::Sms(SmsError::InvalidNumber | SmsError::Undeliverable) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Sms(_) | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Booking(err) => match err {
                BookingError::RideNotFound | BookingError::BookingNotFound => {
                    StatusCode::NOT_FOUND
                }
                BookingError::CannotBookOwnRide
                | BookingError::InsufficientSeats
                | BookingError::DuplicateBooking
                | BookingError::InvalidSeatCount
                | BookingError::NotCancellable => StatusCode::BAD_REQUEST,
                BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidPhone(e) => e.to_string(),
                AuthError::RateLimited => {
                    "Too many OTP requests. Please try again after some time.".to_string()
                }
                AuthError::InvalidOrExpiredCode => {
                    "Invalid or expired OTP. Please request a new one.".to_string()
                }
                AuthError::Sms(SmsError::InvalidNumber) => {
                    "Invalid phone number. Please check and try again.".to_string()
                }
                AuthError::Sms(SmsError::Undeliverable) => {
                    "Unable to send SMS to this number.".to_string()
                }
                AuthError::Sms(_) => "Failed to send OTP. Please try again.".to_string(),
                AuthError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Booking(err) => match err {
                BookingError::RideNotFound => "Ride not found".to_string(),
                BookingError::BookingNotFound => "Booking not found".to_string(),
                BookingError::CannotBookOwnRide => "You cannot book your own ride".to_string(),
                BookingError::InsufficientSeats => "Not enough available seats".to_string(),
                BookingError::DuplicateBooking => {
                    "You already have a booking for this ride".to_string()
                }
                BookingError::InvalidSeatCount => "Seat count must be at least 1".to_string(),
                BookingError::NotCancellable => "This booking cannot be cancelled".to_string(),
                BookingError::Repository(_) => "Internal server error".to_string(),
            },
            Self::RateLimited => "Too many requests".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("ride-123".to_string());
        assert_eq!(err.to_string(), "Not found: ride-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::RateLimited)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidOrExpiredCode)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Sms(SmsError::InvalidNumber))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Sms(SmsError::Provider {
                code: 20003,
                message: "auth".to_string()
            }))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_booking_error_statuses() {
        assert_eq!(
            get_status(AppError::Booking(BookingError::RideNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Booking(BookingError::BookingNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Booking(BookingError::InsufficientSeats)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Booking(BookingError::DuplicateBooking)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Booking(BookingError::CannotBookOwnRide)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "users.phone row 17 is garbage".to_string(),
        ));
        assert_eq!(err.message(), "Internal server error");
    }
}
