//! Booking route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use ridepool_core::{BookingId, RideId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::bookings::BookingService;
use crate::state::AppState;

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub ride_id: Option<i32>,
    /// Defaults to 1 when omitted.
    pub seats: Option<i32>,
}

/// Reserve seats on a ride.
///
/// # Errors
///
/// 401 without a session, 404 for an unknown ride, 400 for own-ride,
/// insufficient-seats, and duplicate-booking violations.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse> {
    let ride_id = req
        .ride_id
        .ok_or_else(|| AppError::BadRequest("Ride ID is required".to_string()))?;
    let seats = req.seats.unwrap_or(1);

    let service = BookingService::new(state.pool());
    let booking = service.create(user.id, RideId::new(ride_id), seats).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// The caller's bookings, newest first.
///
/// # Errors
///
/// 401 without a session.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let service = BookingService::new(state.pool());
    let bookings = service.list(user.id).await?;

    Ok(Json(bookings))
}

/// Cancel one of the caller's active bookings, releasing its seats.
///
/// # Errors
///
/// 401 without a session, 404 for unknown/foreign bookings, 400 when the
/// booking is no longer active.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let service = BookingService::new(state.pool());
    let booking = service
        .cancel(user.id, user.name.as_deref(), BookingId::new(id))
        .await?;

    Ok(Json(booking))
}
