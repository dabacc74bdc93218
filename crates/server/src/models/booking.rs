//! Booking domain types.

use chrono::{DateTime, Utc};
use ridepool_core::{BookingId, BookingStatus, RideId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

use super::ride::Ride;
use super::user::{DriverSummary, PassengerSummary};

/// A seat reservation on a ride (domain type).
///
/// `total_price` is snapshotted at creation time (`ride.price * seats`) so
/// later price edits never change what the passenger agreed to. The
/// `ride_id`/`user_id` pair never mutates after creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub ride_id: RideId,
    pub user_id: UserId,
    /// Number of seats reserved (>= 1).
    pub seats: i32,
    /// Price snapshot at creation time.
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// A booking with its ride and the ride's driver embedded, as returned by
/// the booking list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithRide {
    #[serde(flatten)]
    pub booking: Booking,
    pub ride: Ride,
    pub driver: DriverSummary,
}

/// A freshly created booking with its ride and the passenger embedded, as
/// returned by booking creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    #[serde(flatten)]
    pub booking: Booking,
    pub ride: Ride,
    pub user: PassengerSummary,
}
