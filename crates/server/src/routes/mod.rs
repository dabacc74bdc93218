//! HTTP route handlers for the Ridepool API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Auth (per-IP rate limited)
//! POST /auth/send-otp          - Issue and dispatch a one-time code
//! POST /auth/verify-otp        - Verify a code, resolve the identity
//! POST /auth/login             - Session exchange for a verified code
//! POST /auth/logout            - Clear the session
//!
//! # Rides
//! GET  /rides                  - Search active rides (filters + pagination)
//! POST /rides                  - Publish a ride (requires auth)
//! GET  /rides/{id}             - Ride detail with driver
//!
//! # Bookings (require auth)
//! GET  /bookings               - Caller's bookings, newest first
//! POST /bookings               - Reserve seats (201 on success)
//! POST /bookings/{id}/cancel   - Cancel an active booking
//!
//! # Notifications (require auth)
//! GET  /notifications          - Caller's newest 50
//! PUT  /notifications          - Mark all unread as read
//! ```

pub mod auth;
pub mod bookings;
pub mod notifications;
pub mod rides;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the ride routes router.
pub fn ride_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(rides::search).post(rides::create))
        .route("/{id}", get(rides::show))
}

/// Create the booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bookings::list).post(bookings::create))
        .route("/{id}/cancel", post(bookings::cancel))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(notifications::list).put(notifications::mark_all_read),
    )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/rides", ride_routes())
        .nest("/bookings", booking_routes())
        .nest("/notifications", notification_routes())
}
