//! Ride domain types.

use chrono::{DateTime, NaiveDate, Utc};
use ridepool_core::{RideId, RideStatus, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

use super::user::DriverSummary;

/// A published ride (domain type).
///
/// `seats` is the immutable capacity; `available_seats` is the live inventory
/// counter, mutated only by booking creation and cancellation. The database
/// enforces `0 <= available_seats <= seats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: RideId,
    /// The driver who published this ride.
    pub driver_id: UserId,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    /// Departure time as entered by the driver (e.g. "08:30").
    pub departure_time: String,
    /// Total seat capacity, fixed at publication.
    pub seats: i32,
    /// Unbooked seats remaining.
    pub available_seats: i32,
    /// Price per seat.
    pub price: Decimal,
    pub status: RideStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A ride with its driver summary embedded, as returned by search and detail
/// endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideWithDriver {
    #[serde(flatten)]
    pub ride: Ride,
    pub driver: DriverSummary,
}
