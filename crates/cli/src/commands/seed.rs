//! Demo data seeding for local development.
//!
//! Inserts a handful of verified users and published rides so the search
//! and booking endpoints have something to work against. Idempotent: the
//! `ON CONFLICT DO NOTHING` clauses make re-running it harmless.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{CommandError, connect};

struct SeedUser {
    phone: &'static str,
    name: &'static str,
}

struct SeedRide {
    driver_phone: &'static str,
    origin: &'static str,
    destination: &'static str,
    days_out: i64,
    time: &'static str,
    seats: i32,
    price: Decimal,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        phone: "+15550100001",
        name: "Maya Driver",
    },
    SeedUser {
        phone: "+15550100002",
        name: "Omar Driver",
    },
    SeedUser {
        phone: "+15550100003",
        name: "Priya Passenger",
    },
];

fn rides() -> Vec<SeedRide> {
    vec![
        SeedRide {
            driver_phone: "+15550100001",
            origin: "Lyon",
            destination: "Paris",
            days_out: 3,
            time: "08:30",
            seats: 3,
            price: Decimal::new(2500, 2),
        },
        SeedRide {
            driver_phone: "+15550100001",
            origin: "Paris",
            destination: "Lyon",
            days_out: 5,
            time: "18:00",
            seats: 3,
            price: Decimal::new(2500, 2),
        },
        SeedRide {
            driver_phone: "+15550100002",
            origin: "Marseille",
            destination: "Nice",
            days_out: 2,
            time: "09:15",
            seats: 2,
            price: Decimal::new(1800, 2),
        },
    ]
}

/// Seed the database with demo users and rides.
///
/// # Errors
///
/// Returns `CommandError` if the connection or any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    for user in USERS {
        seed_user(&pool, user).await?;
    }

    for ride in rides() {
        seed_ride(&pool, &ride).await?;
    }

    tracing::info!("Seed complete");
    Ok(())
}

async fn seed_user(pool: &PgPool, user: &SeedUser) -> Result<(), CommandError> {
    let digits: String = user.phone.chars().filter(char::is_ascii_digit).collect();

    sqlx::query(
        "INSERT INTO users (phone, email, name, verified)
         VALUES ($1, $2, $3, TRUE)
         ON CONFLICT (phone) DO NOTHING",
    )
    .bind(user.phone)
    .bind(format!("{digits}@ridepool.phone"))
    .bind(user.name)
    .execute(pool)
    .await?;

    tracing::info!(phone = user.phone, name = user.name, "seeded user");
    Ok(())
}

async fn seed_ride(pool: &PgPool, ride: &SeedRide) -> Result<(), CommandError> {
    let driver_id: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE phone = $1")
        .bind(ride.driver_phone)
        .fetch_optional(pool)
        .await?;

    let Some(driver_id) = driver_id else {
        tracing::warn!(phone = ride.driver_phone, "seed driver missing, skipping ride");
        return Ok(());
    };

    let date = (Utc::now() + Duration::days(ride.days_out)).date_naive();

    // No natural key for rides, so dedupe on (driver, route, date).
    let exists: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM rides
         WHERE driver_id = $1 AND origin = $2 AND destination = $3 AND departure_date = $4",
    )
    .bind(driver_id)
    .bind(ride.origin)
    .bind(ride.destination)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    if exists.is_some() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO rides
             (driver_id, origin, destination, departure_date, departure_time,
              seats, available_seats, price)
         VALUES ($1, $2, $3, $4, $5, $6, $6, $7)",
    )
    .bind(driver_id)
    .bind(ride.origin)
    .bind(ride.destination)
    .bind(date)
    .bind(ride.time)
    .bind(ride.seats)
    .bind(ride.price)
    .execute(pool)
    .await?;

    tracing::info!(
        origin = ride.origin,
        destination = ride.destination,
        "seeded ride"
    );
    Ok(())
}
