//! Integration tests for ride publishing and seat booking.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p ridepool-server)
//!
//! Run with: cargo test -p ridepool-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use ridepool_integration_tests::{TestContext, unique_phone};

/// Sign in a fresh driver and publish a ride, returning (driver ctx, ride id).
async fn driver_with_ride(seats: i32) -> (TestContext, i64) {
    let driver = TestContext::new().await;
    driver.sign_in(&unique_phone()).await;
    let ride_id = driver.publish_ride(seats).await;
    (driver, ride_id)
}

async fn fetch_available_seats(ctx: &TestContext, ride_id: i64) -> i64 {
    let resp = ctx
        .client
        .get(format!("{}/rides/{ride_id}", ctx.base_url))
        .send()
        .await
        .expect("ride detail failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("ride detail was not JSON");
    body["availableSeats"]
        .as_i64()
        .expect("ride detail missing availableSeats")
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_booking_decrements_available_seats() {
    let (_driver, ride_id) = driver_with_ride(3).await;

    let passenger = TestContext::new().await;
    let me = passenger.sign_in(&unique_phone()).await;

    let resp = passenger
        .client
        .post(format!("{}/bookings", passenger.base_url))
        .json(&json!({ "rideId": ride_id, "seats": 2 }))
        .send()
        .await
        .expect("booking failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let booking: Value = resp.json().await.expect("booking was not JSON");
    assert_eq!(booking["status"].as_str(), Some("confirmed"));
    assert_eq!(booking["seats"].as_i64(), Some(2));
    // 25.00 per seat, snapshotted at creation.
    assert_eq!(booking["totalPrice"].as_str(), Some("50.00"));

    // The creation body embeds the ride and the passenger, not the driver.
    assert_eq!(booking["user"]["id"], me["id"]);
    assert_eq!(booking["user"]["email"], me["email"]);
    assert!(booking.get("driver").is_none());
    assert_eq!(booking["ride"]["availableSeats"].as_i64(), Some(1));

    assert_eq!(fetch_available_seats(&passenger, ride_id).await, 1);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_duplicate_booking_rejected() {
    let (_driver, ride_id) = driver_with_ride(4).await;

    let passenger = TestContext::new().await;
    passenger.sign_in(&unique_phone()).await;

    let resp = passenger
        .client
        .post(format!("{}/bookings", passenger.base_url))
        .json(&json!({ "rideId": ride_id }))
        .send()
        .await
        .expect("first booking failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = passenger
        .client
        .post(format!("{}/bookings", passenger.base_url))
        .json(&json!({ "rideId": ride_id }))
        .send()
        .await
        .expect("second booking failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The rejected attempt must not have touched the inventory.
    assert_eq!(fetch_available_seats(&passenger, ride_id).await, 3);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_cannot_book_own_ride() {
    let (driver, ride_id) = driver_with_ride(3).await;

    let resp = driver
        .client
        .post(format!("{}/bookings", driver.base_url))
        .json(&json!({ "rideId": ride_id }))
        .send()
        .await
        .expect("booking failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_insufficient_seats_rejected() {
    let (_driver, ride_id) = driver_with_ride(1).await;

    let passenger = TestContext::new().await;
    passenger.sign_in(&unique_phone()).await;

    let resp = passenger
        .client
        .post(format!("{}/bookings", passenger.base_url))
        .json(&json!({ "rideId": ride_id, "seats": 2 }))
        .send()
        .await
        .expect("booking failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(fetch_available_seats(&passenger, ride_id).await, 1);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_booking_requires_session() {
    let (_driver, ride_id) = driver_with_ride(3).await;

    let anonymous = TestContext::new().await;
    let resp = anonymous
        .client
        .post(format!("{}/bookings", anonymous.base_url))
        .json(&json!({ "rideId": ride_id }))
        .send()
        .await
        .expect("booking failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_cancel_releases_seats() {
    let (_driver, ride_id) = driver_with_ride(3).await;

    let passenger = TestContext::new().await;
    passenger.sign_in(&unique_phone()).await;

    let resp = passenger
        .client
        .post(format!("{}/bookings", passenger.base_url))
        .json(&json!({ "rideId": ride_id, "seats": 2 }))
        .send()
        .await
        .expect("booking failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booking: Value = resp.json().await.expect("booking was not JSON");
    let booking_id = booking["id"].as_i64().expect("booking missing id");

    let resp = passenger
        .client
        .post(format!("{}/bookings/{booking_id}/cancel", passenger.base_url))
        .send()
        .await
        .expect("cancel failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let cancelled: Value = resp.json().await.expect("cancel response was not JSON");
    assert_eq!(cancelled["status"].as_str(), Some("cancelled"));

    assert_eq!(fetch_available_seats(&passenger, ride_id).await, 3);

    // Cancelling again is a no-op error, not a second seat release.
    let resp = passenger
        .client
        .post(format!("{}/bookings/{booking_id}/cancel", passenger.base_url))
        .send()
        .await
        .expect("second cancel failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fetch_available_seats(&passenger, ride_id).await, 3);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_concurrent_bookings_never_oversell() {
    const SEATS: i32 = 3;
    const PASSENGERS: usize = 6;

    let (driver, ride_id) = driver_with_ride(SEATS).await;

    // Sign everyone in up front so the race is purely over the inventory.
    let mut passengers = Vec::with_capacity(PASSENGERS);
    for _ in 0..PASSENGERS {
        let ctx = TestContext::new().await;
        ctx.sign_in(&unique_phone()).await;
        passengers.push(ctx);
    }

    let mut handles = Vec::with_capacity(PASSENGERS);
    for ctx in &passengers {
        let client = ctx.client.clone();
        let url = format!("{}/bookings", ctx.base_url);
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "rideId": ride_id, "seats": 1 }))
                .send()
                .await
                .expect("booking request failed")
                .status()
        }));
    }

    let mut created = 0i32;
    for handle in handles {
        let status = handle.await.expect("task panicked");
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    // Exactly the capacity is sold, never more.
    assert_eq!(created, SEATS);
    assert_eq!(fetch_available_seats(&driver, ride_id).await, 0);

    // The database-level counter agrees.
    let db_seats: i32 = sqlx::query_scalar("SELECT available_seats FROM rides WHERE id = $1")
        .bind(i32::try_from(ride_id).expect("ride id fits i32"))
        .fetch_one(&driver.pool)
        .await
        .expect("ride row missing");
    assert_eq!(db_seats, 0);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_booking_list_shows_ride_and_driver() {
    let (_driver, ride_id) = driver_with_ride(3).await;

    let passenger = TestContext::new().await;
    passenger.sign_in(&unique_phone()).await;

    let resp = passenger
        .client
        .post(format!("{}/bookings", passenger.base_url))
        .json(&json!({ "rideId": ride_id }))
        .send()
        .await
        .expect("booking failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = passenger
        .client
        .get(format!("{}/bookings", passenger.base_url))
        .send()
        .await
        .expect("booking list failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let bookings: Value = resp.json().await.expect("booking list was not JSON");
    let list = bookings.as_array().expect("booking list not an array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["rideId"].as_i64(), Some(ride_id));
    assert_eq!(list[0]["ride"]["origin"].as_str(), Some("Lyon"));
    assert!(list[0]["driver"].is_object());
}
