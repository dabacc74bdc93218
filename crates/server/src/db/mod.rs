//! Database operations for the Ridepool `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Identities created on first phone verification
//! - `otps` - One-time verification codes (history rows per phone)
//! - `rides` - Published rides with the `available_seats` inventory counter
//! - `bookings` - Seat reservations with snapshotted totals
//! - `notifications` - In-app notifications for drivers and passengers
//! - `sessions` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p ridepool-cli -- migrate
//! ```
//!
//! Queries are runtime-bound (`sqlx::query` / `query_as`) rather than
//! compile-time checked macros so the workspace builds without a live
//! database.

pub mod bookings;
pub mod notifications;
pub mod otps;
pub mod rides;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use bookings::BookingRepository;
pub use notifications::NotificationRepository;
pub use otps::OtpRepository;
pub use rides::RideRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique phone).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
