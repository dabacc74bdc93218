//! Integration tests for Ridepool.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! cargo run -p ridepool-cli -- migrate
//!
//! # Start the server
//! cargo run -p ridepool-server
//!
//! # Run the ignored integration tests
//! cargo test -p ridepool-integration-tests -- --ignored
//! ```
//!
//! The OTP flow tests read the issued code straight from the `otps` table,
//! so no Twilio delivery is needed; point `TWILIO_*` at test credentials or
//! a Twilio test account.

use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use sqlx::PgPool;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("RIDEPOOL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Shared handles for one test: a cookie-holding HTTP client plus a direct
/// database connection for assertions and OTP retrieval.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: PgPool,
}

impl TestContext {
    /// Connect to the running server and database.
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is unset or the database is unreachable.
    pub async fn new() -> Self {
        let database_url = std::env::var("RIDEPOOL_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("DATABASE_URL must be set for integration tests");

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database");

        // The auth endpoints rate-limit per client IP taken from proxy
        // headers. A unique synthetic IP per context keeps tests from
        // draining each other's budget.
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            unique_client_ip().parse().expect("valid header value"),
        );

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url(),
            pool,
        }
    }

    /// Fetch the newest unverified code issued for a phone, bypassing SMS.
    ///
    /// # Panics
    ///
    /// Panics if the query fails or no code exists.
    pub async fn latest_code(&self, phone: &str) -> String {
        sqlx::query_scalar(
            "SELECT code FROM otps
             WHERE phone = $1 AND verified = FALSE
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .expect("No unverified code found for phone")
    }

    /// Run the full sign-in flow for a phone: send-otp, verify-otp, login.
    /// The session cookie lands in this context's client.
    ///
    /// # Panics
    ///
    /// Panics if any step fails.
    pub async fn sign_in(&self, phone: &str) -> Value {
        let resp = self
            .client
            .post(format!("{}/auth/send-otp", self.base_url))
            .json(&serde_json::json!({ "phone": phone }))
            .send()
            .await
            .expect("send-otp request failed");
        assert!(
            resp.status().is_success(),
            "send-otp returned {}",
            resp.status()
        );

        let code = self.latest_code(phone).await;

        let resp = self
            .client
            .post(format!("{}/auth/verify-otp", self.base_url))
            .json(&serde_json::json!({ "phone": phone, "code": code }))
            .send()
            .await
            .expect("verify-otp request failed");
        assert!(
            resp.status().is_success(),
            "verify-otp returned {}",
            resp.status()
        );

        let resp = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "phone": phone, "code": code }))
            .send()
            .await
            .expect("login request failed");
        assert!(resp.status().is_success(), "login returned {}", resp.status());

        resp.json().await.expect("login response was not JSON")
    }

    /// Publish a ride as the signed-in user and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn publish_ride(&self, seats: i32) -> i64 {
        let resp = self
            .client
            .post(format!("{}/rides", self.base_url))
            .json(&serde_json::json!({
                "origin": "Lyon",
                "destination": "Paris",
                "departureDate": "2027-06-01",
                "departureTime": "08:30",
                "seats": seats,
                "price": "25.00",
            }))
            .send()
            .await
            .expect("ride create request failed");
        assert_eq!(resp.status().as_u16(), 201, "ride create did not return 201");

        let body: Value = resp.json().await.expect("ride response was not JSON");
        body["id"].as_i64().expect("ride response missing id")
    }
}

/// A fresh E.164-looking phone number, unique enough for test isolation.
#[must_use]
pub fn unique_phone() -> String {
    let suffix: u64 = rand::rng().random_range(1_000_000_000..10_000_000_000);
    format!("+1555{suffix}")
}

/// A random private-range IP for the `x-forwarded-for` header.
#[must_use]
pub fn unique_client_ip() -> String {
    let mut rng = rand::rng();
    format!(
        "10.{}.{}.{}",
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8),
        rng.random_range(1..=254u8)
    )
}
