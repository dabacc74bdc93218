//! Booking service: seat-inventory reservation and release.
//!
//! The one hard invariant here is that a ride's `available_seats` never goes
//! negative under concurrent bookings. Preconditions are checked against a
//! plain read for early, friendly errors, but correctness never depends on
//! that read: the repository's conditional decrement re-checks availability
//! under the row lock and the service maps a zero-row update back to
//! `InsufficientSeats`.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use ridepool_core::{BookingId, RideId, UserId};

use crate::db::RepositoryError;
use crate::db::bookings::{BookingRepository, DriverNotice};
use crate::db::rides::RideRepository;
use crate::db::users::UserRepository;
use crate::models::{Booking, BookingConfirmation, BookingWithRide, PassengerSummary, Ride};

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Unknown ride ID.
    #[error("ride not found")]
    RideNotFound,

    /// Drivers cannot book their own rides.
    #[error("cannot book your own ride")]
    CannotBookOwnRide,

    /// Fewer seats available than requested.
    #[error("not enough available seats")]
    InsufficientSeats,

    /// Caller already holds a pending or confirmed booking on this ride.
    #[error("already booked this ride")]
    DuplicateBooking,

    /// Requested seat count below 1.
    #[error("seat count must be at least 1")]
    InvalidSeatCount,

    /// Unknown booking ID, or booking owned by someone else.
    #[error("booking not found")]
    BookingNotFound,

    /// Booking is no longer pending or confirmed.
    #[error("booking cannot be cancelled")]
    NotCancellable,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Booking service.
pub struct BookingService<'a> {
    rides: RideRepository<'a>,
    bookings: BookingRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> BookingService<'a> {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            rides: RideRepository::new(pool),
            bookings: BookingRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Reserve seats on a ride for the caller.
    ///
    /// Preconditions, in order: ride exists, caller is not the driver, seats
    /// are available, no duplicate active booking. The writes (decrement,
    /// booking insert, driver notification) are one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns the corresponding `BookingError` for each violated
    /// precondition; `InsufficientSeats` can also surface from the
    /// transaction itself when a concurrent booking takes the seats between
    /// the precondition read and the conditional decrement.
    pub async fn create(
        &self,
        caller: UserId,
        ride_id: RideId,
        seats: i32,
    ) -> Result<BookingConfirmation, BookingError> {
        if seats < 1 {
            return Err(BookingError::InvalidSeatCount);
        }

        let ride = self
            .rides
            .get(ride_id)
            .await?
            .ok_or(BookingError::RideNotFound)?;

        if ride.driver_id == caller {
            return Err(BookingError::CannotBookOwnRide);
        }

        if ride.available_seats < seats {
            return Err(BookingError::InsufficientSeats);
        }

        if self.bookings.find_active(ride_id, caller).await?.is_some() {
            return Err(BookingError::DuplicateBooking);
        }

        // The session only carries the user's ID; the driver notice and the
        // response passenger block come from the authoritative row.
        let passenger = self
            .users
            .get_by_id(caller)
            .await?
            .ok_or(BookingError::Repository(RepositoryError::NotFound))?;

        // Snapshot the total so later price edits never change the agreement.
        let total_price = ride.price * Decimal::from(seats);
        let notice = booking_notice(&ride, passenger.name.as_deref(), seats);

        let booking = self
            .bookings
            .create_confirmed(ride_id, caller, seats, total_price, &notice)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => BookingError::DuplicateBooking,
                other => BookingError::Repository(other),
            })?
            .ok_or(BookingError::InsufficientSeats)?;

        tracing::info!(
            booking_id = %booking.id,
            ride_id = %ride_id,
            user_id = %caller,
            seats,
            "booking confirmed"
        );

        // Re-read for the post-decrement seat count.
        let ride = self
            .rides
            .get(ride_id)
            .await?
            .ok_or(BookingError::RideNotFound)?;

        Ok(BookingConfirmation {
            user: PassengerSummary::from(&passenger),
            booking,
            ride,
        })
    }

    /// Cancel one of the caller's active bookings, releasing its seats.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::BookingNotFound` for unknown or foreign
    /// bookings and `BookingError::NotCancellable` when the booking is
    /// already cancelled or completed.
    pub async fn cancel(
        &self,
        caller: UserId,
        caller_name: Option<&str>,
        booking_id: BookingId,
    ) -> Result<Booking, BookingError> {
        let existing = self
            .bookings
            .get_for_user(booking_id, caller)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if !existing.status.is_active() {
            return Err(BookingError::NotCancellable);
        }

        let ride = self
            .rides
            .get(existing.ride_id)
            .await?
            .ok_or(BookingError::RideNotFound)?;

        let notice = cancellation_notice(&ride, caller_name, existing.seats);

        // A concurrent cancel may have won; the conditional UPDATE inside the
        // transaction is authoritative.
        let booking = self
            .bookings
            .cancel(booking_id, caller, &notice)
            .await?
            .ok_or(BookingError::NotCancellable)?;

        tracing::info!(booking_id = %booking.id, ride_id = %ride.id, "booking cancelled");
        Ok(booking)
    }

    /// The caller's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Repository` if the query fails.
    pub async fn list(&self, caller: UserId) -> Result<Vec<BookingWithRide>, BookingError> {
        Ok(self.bookings.list_for_user(caller).await?)
    }
}

fn display_name(name: Option<&str>) -> &str {
    name.filter(|n| !n.is_empty()).unwrap_or("A passenger")
}

fn booking_notice(ride: &Ride, passenger: Option<&str>, seats: i32) -> DriverNotice {
    DriverNotice {
        recipient: ride.driver_id,
        kind: "booking",
        title: "New Booking".to_owned(),
        message: format!(
            "{} booked {} seat(s) on your ride from {} to {}",
            display_name(passenger),
            seats,
            ride.origin,
            ride.destination
        ),
        link: format!("/rides/{}", ride.id),
    }
}

fn cancellation_notice(ride: &Ride, passenger: Option<&str>, seats: i32) -> DriverNotice {
    DriverNotice {
        recipient: ride.driver_id,
        kind: "booking",
        title: "Booking Cancelled".to_owned(),
        message: format!(
            "{} cancelled {} seat(s) on your ride from {} to {}",
            display_name(passenger),
            seats,
            ride.origin,
            ride.destination
        ),
        link: format!("/rides/{}", ride.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use ridepool_core::RideStatus;

    fn sample_ride() -> Ride {
        Ride {
            id: RideId::new(1),
            driver_id: UserId::new(2),
            origin: "Lyon".to_owned(),
            destination: "Paris".to_owned(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
            departure_time: "08:30".to_owned(),
            seats: 3,
            available_seats: 1,
            price: Decimal::new(2500, 2),
            status: RideStatus::Active,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_booking_notice_message() {
        let ride = sample_ride();
        let notice = booking_notice(&ride, Some("Ana"), 2);
        assert_eq!(notice.recipient, ride.driver_id);
        assert_eq!(notice.kind, "booking");
        assert_eq!(
            notice.message,
            "Ana booked 2 seat(s) on your ride from Lyon to Paris"
        );
        assert_eq!(notice.link, "/rides/1");
    }

    #[test]
    fn test_notice_falls_back_for_anonymous_passenger() {
        let ride = sample_ride();
        let notice = booking_notice(&ride, None, 1);
        assert!(notice.message.starts_with("A passenger booked"));
        let notice = cancellation_notice(&ride, Some(""), 1);
        assert!(notice.message.starts_with("A passenger cancelled"));
    }

    #[test]
    fn test_total_price_snapshot_arithmetic() {
        let ride = sample_ride();
        let total = ride.price * Decimal::from(3);
        assert_eq!(total, Decimal::new(7500, 2));
    }
}
