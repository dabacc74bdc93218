//! Booking repository: the seat-inventory transaction.
//!
//! Seat inventory is the one contended resource in this system. Two
//! passengers racing for the last seat must never both succeed, so the
//! decrement is a conditional write (`available_seats >= N` in the UPDATE
//! predicate) whose affected-row count is checked inside the transaction,
//! rather than a read-then-write against a possibly stale count. Postgres
//! row locking serializes the conflicting UPDATEs; the loser sees the
//! already-decremented value and affects zero rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use ridepool_core::{BookingId, BookingStatus, RideId, UserId};

use super::RepositoryError;
use crate::models::user::DriverSummary;
use crate::models::{Booking, BookingWithRide, Ride};

/// Raw `bookings` row.
#[derive(Debug, FromRow)]
struct BookingRow {
    id: i32,
    ride_id: i32,
    user_id: i32,
    seats: i32,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid booking status in database: {e}"))
        })?;

        Ok(Self {
            id: BookingId::new(row.id),
            ride_id: RideId::new(row.ride_id),
            user_id: UserId::new(row.user_id),
            seats: row.seats,
            total_price: row.total_price,
            status,
            created_at: row.created_at,
        })
    }
}

/// Booking row joined with its ride and the ride's driver summary.
#[derive(Debug, FromRow)]
struct BookingWithRideRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    ride_driver_id: i32,
    origin: String,
    destination: String,
    departure_date: chrono::NaiveDate,
    departure_time: String,
    ride_seats: i32,
    available_seats: i32,
    price: Decimal,
    ride_status: String,
    description: Option<String>,
    ride_created_at: DateTime<Utc>,
    driver_name: Option<String>,
    driver_image: Option<String>,
    driver_rating: f64,
    driver_total_rides: i32,
    driver_verified: bool,
}

impl TryFrom<BookingWithRideRow> for BookingWithRide {
    type Error = RepositoryError;

    fn try_from(row: BookingWithRideRow) -> Result<Self, Self::Error> {
        let ride_status = row.ride_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid ride status in database: {e}"))
        })?;

        let ride = Ride {
            id: RideId::new(row.booking.ride_id),
            driver_id: UserId::new(row.ride_driver_id),
            origin: row.origin,
            destination: row.destination,
            departure_date: row.departure_date,
            departure_time: row.departure_time,
            seats: row.ride_seats,
            available_seats: row.available_seats,
            price: row.price,
            status: ride_status,
            description: row.description,
            created_at: row.ride_created_at,
        };

        let driver = DriverSummary {
            id: UserId::new(row.ride_driver_id),
            name: row.driver_name,
            image: row.driver_image,
            rating: row.driver_rating,
            total_rides: row.driver_total_rides,
            verified: row.driver_verified,
        };

        Ok(Self {
            booking: Booking::try_from(row.booking)?,
            ride,
            driver,
        })
    }
}

const BOOKING_COLUMNS: &str = "b.id, b.ride_id, b.user_id, b.seats, b.total_price, b.status, b.created_at";

const BOOKING_JOIN_COLUMNS: &str = "b.id, b.ride_id, b.user_id, b.seats, b.total_price, b.status, b.created_at, \
     r.driver_id AS ride_driver_id, r.origin, r.destination, r.departure_date, r.departure_time, \
     r.seats AS ride_seats, r.available_seats, r.price, r.status AS ride_status, r.description, \
     r.created_at AS ride_created_at, \
     u.name AS driver_name, u.image AS driver_image, u.rating AS driver_rating, \
     u.total_rides AS driver_total_rides, u.verified AS driver_verified";

/// Notification content written inside the booking transaction.
#[derive(Debug)]
pub struct DriverNotice {
    pub recipient: UserId,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub link: String,
}

/// Repository for booking database operations.
pub struct BookingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepository<'a> {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the caller's active (pending or confirmed) booking on a ride.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active(
        &self,
        ride: RideId,
        user: UserId,
    ) -> Result<Option<Booking>, RepositoryError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b
             WHERE b.ride_id = $1 AND b.user_id = $2 AND b.status IN ('pending', 'confirmed')
             LIMIT 1"
        ))
        .bind(ride.as_i32())
        .bind(user.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    /// Atomically reserve seats: decrement the ride's inventory, insert the
    /// confirmed booking, and insert the driver's notification. All three
    /// writes commit or roll back together.
    ///
    /// Returns `Ok(None)` when the conditional decrement affects zero rows,
    /// i.e. another booking consumed the seats first; the transaction is
    /// rolled back and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the caller already holds an
    /// active booking on this ride (partial unique index).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_confirmed(
        &self,
        ride: RideId,
        user: UserId,
        seats: i32,
        total_price: Decimal,
        notice: &DriverNotice,
    ) -> Result<Option<Booking>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: the WHERE clause re-checks availability under
        // the row lock, so concurrent transactions cannot both pass a stale
        // precondition read.
        let updated = sqlx::query(
            "UPDATE rides SET available_seats = available_seats - $2
             WHERE id = $1 AND available_seats >= $2",
        )
        .bind(ride.as_i32())
        .bind(seats)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row: BookingRow = sqlx::query_as(
            "INSERT INTO bookings (ride_id, user_id, seats, total_price, status)
             VALUES ($1, $2, $3, $4, 'confirmed')
             RETURNING id, ride_id, user_id, seats, total_price, status, created_at",
        )
        .bind(ride.as_i32())
        .bind(user.as_i32())
        .bind(seats)
        .bind(total_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("active booking already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        insert_notice(&mut tx, notice).await?;

        tx.commit().await?;

        Booking::try_from(row).map(Some)
    }

    /// Cancel an active booking and release its seats back to the ride,
    /// notifying the driver, in one transaction.
    ///
    /// Returns `Ok(None)` if the booking is no longer active (already
    /// cancelled or completed by a concurrent request).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn cancel(
        &self,
        booking: BookingId,
        user: UserId,
        notice: &DriverNotice,
    ) -> Result<Option<Booking>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BookingRow> = sqlx::query_as(
            "UPDATE bookings SET status = 'cancelled'
             WHERE id = $1 AND user_id = $2 AND status IN ('pending', 'confirmed')
             RETURNING id, ride_id, user_id, seats, total_price, status, created_at",
        )
        .bind(booking.as_i32())
        .bind(user.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Symmetric increment; the CHECK constraint keeps the counter <= seats.
        sqlx::query("UPDATE rides SET available_seats = available_seats + $2 WHERE id = $1")
            .bind(row.ride_id)
            .bind(row.seats)
            .execute(&mut *tx)
            .await?;

        insert_notice(&mut tx, notice).await?;

        tx.commit().await?;

        Booking::try_from(row).map(Some)
    }

    /// The caller's bookings, newest first, each with its ride and driver.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<BookingWithRide>, RepositoryError> {
        let rows: Vec<BookingWithRideRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_JOIN_COLUMNS}
             FROM bookings b
             JOIN rides r ON r.id = b.ride_id
             JOIN users u ON u.id = r.driver_id
             WHERE b.user_id = $1
             ORDER BY b.created_at DESC"
        ))
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(BookingWithRide::try_from).collect()
    }

    /// Get one of the caller's bookings by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        booking: BookingId,
        user: UserId,
    ) -> Result<Option<Booking>, RepositoryError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = $1 AND b.user_id = $2"
        ))
        .bind(booking.as_i32())
        .bind(user.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }
}

/// Insert a notification row inside an open booking transaction.
async fn insert_notice(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    notice: &DriverNotice,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO notifications (user_id, kind, title, message, link)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(notice.recipient.as_i32())
    .bind(notice.kind)
    .bind(&notice.title)
    .bind(&notice.message)
    .bind(&notice.link)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
