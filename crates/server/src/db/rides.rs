//! Ride repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use ridepool_core::{RideId, RideStatus, UserId};

use super::RepositoryError;
use crate::models::user::DriverSummary;
use crate::models::{Ride, RideWithDriver};

/// Raw `rides` row.
#[derive(Debug, FromRow)]
struct RideRow {
    id: i32,
    driver_id: i32,
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    departure_time: String,
    seats: i32,
    available_seats: i32,
    price: Decimal,
    status: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

/// Raw ride row joined with its driver's summary columns.
#[derive(Debug, FromRow)]
struct RideWithDriverRow {
    #[sqlx(flatten)]
    ride: RideRow,
    driver_name: Option<String>,
    driver_image: Option<String>,
    driver_rating: f64,
    driver_total_rides: i32,
    driver_verified: bool,
}

impl TryFrom<RideRow> for Ride {
    type Error = RepositoryError;

    fn try_from(row: RideRow) -> Result<Self, Self::Error> {
        let status: RideStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid ride status in database: {e}"))
        })?;

        Ok(Self {
            id: RideId::new(row.id),
            driver_id: UserId::new(row.driver_id),
            origin: row.origin,
            destination: row.destination,
            departure_date: row.departure_date,
            departure_time: row.departure_time,
            seats: row.seats,
            available_seats: row.available_seats,
            price: row.price,
            status,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<RideWithDriverRow> for RideWithDriver {
    type Error = RepositoryError;

    fn try_from(row: RideWithDriverRow) -> Result<Self, Self::Error> {
        let driver = DriverSummary {
            id: UserId::new(row.ride.driver_id),
            name: row.driver_name,
            image: row.driver_image,
            rating: row.driver_rating,
            total_rides: row.driver_total_rides,
            verified: row.driver_verified,
        };

        Ok(Self {
            ride: Ride::try_from(row.ride)?,
            driver,
        })
    }
}

const RIDE_COLUMNS: &str = "r.id, r.driver_id, r.origin, r.destination, r.departure_date, \
     r.departure_time, r.seats, r.available_seats, r.price, r.status, r.description, r.created_at";

const DRIVER_COLUMNS: &str = "u.name AS driver_name, u.image AS driver_image, \
     u.rating AS driver_rating, u.total_rides AS driver_total_rides, u.verified AS driver_verified";

/// Fields for publishing a new ride.
#[derive(Debug)]
pub struct NewRide {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub seats: i32,
    pub price: Decimal,
    pub description: Option<String>,
}

/// Search filters for the ride listing.
#[derive(Debug, Clone)]
pub struct RideSearch {
    /// Substring match on origin.
    pub origin: Option<String>,
    /// Substring match on destination.
    pub destination: Option<String>,
    /// Exact departure date.
    pub date: Option<NaiveDate>,
    /// Minimum free seats (defaults to 1 at the route layer).
    pub min_seats: i32,
    /// 1-based page number.
    pub page: i64,
    /// Page size.
    pub limit: i64,
}

/// Repository for ride database operations.
pub struct RideRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RideRepository<'a> {
    /// Create a new ride repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Publish a new ride. `available_seats` starts at full capacity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, driver: UserId, ride: &NewRide) -> Result<Ride, RepositoryError> {
        let row: RideRow = sqlx::query_as(
            "INSERT INTO rides
                 (driver_id, origin, destination, departure_date, departure_time,
                  seats, available_seats, price, description)
             VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8)
             RETURNING id, driver_id, origin, destination, departure_date, departure_time,
                       seats, available_seats, price, status, description, created_at",
        )
        .bind(driver.as_i32())
        .bind(&ride.origin)
        .bind(&ride.destination)
        .bind(ride.departure_date)
        .bind(&ride.departure_time)
        .bind(ride.seats)
        .bind(ride.price)
        .bind(&ride.description)
        .fetch_one(self.pool)
        .await?;

        Ride::try_from(row)
    }

    /// Get a ride by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: RideId) -> Result<Option<Ride>, RepositoryError> {
        let row: Option<RideRow> = sqlx::query_as(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides r WHERE r.id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Ride::try_from).transpose()
    }

    /// Get a ride with its driver summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_driver(
        &self,
        id: RideId,
    ) -> Result<Option<RideWithDriver>, RepositoryError> {
        let row: Option<RideWithDriverRow> = sqlx::query_as(&format!(
            "SELECT {RIDE_COLUMNS}, {DRIVER_COLUMNS}
             FROM rides r
             JOIN users u ON u.id = r.driver_id
             WHERE r.id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(RideWithDriver::try_from).transpose()
    }

    /// Search active rides with optional filters and pagination.
    ///
    /// Returns the page of rides and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        search: &RideSearch,
    ) -> Result<(Vec<RideWithDriver>, i64), RepositoryError> {
        // NULL filter parameters disable the corresponding predicate, which
        // keeps this a single prepared statement for every filter combination.
        const FILTERS: &str = "r.status = 'active'
             AND r.available_seats >= $1
             AND ($2::text IS NULL OR r.origin ILIKE '%' || $2 || '%')
             AND ($3::text IS NULL OR r.destination ILIKE '%' || $3 || '%')
             AND ($4::date IS NULL OR r.departure_date = $4)";

        let offset = (search.page.max(1) - 1) * search.limit;

        let rows: Vec<RideWithDriverRow> = sqlx::query_as(&format!(
            "SELECT {RIDE_COLUMNS}, {DRIVER_COLUMNS}
             FROM rides r
             JOIN users u ON u.id = r.driver_id
             WHERE {FILTERS}
             ORDER BY r.departure_date ASC, r.departure_time ASC
             LIMIT $5 OFFSET $6"
        ))
        .bind(search.min_seats)
        .bind(&search.origin)
        .bind(&search.destination)
        .bind(search.date)
        .bind(search.limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM rides r WHERE {FILTERS}"
        ))
        .bind(search.min_seats)
        .bind(&search.origin)
        .bind(&search.destination)
        .bind(search.date)
        .fetch_one(self.pool)
        .await?;

        let rides = rows
            .into_iter()
            .map(RideWithDriver::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((rides, total))
    }
}
