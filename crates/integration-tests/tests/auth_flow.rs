//! Integration tests for the phone-OTP authentication flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p ridepool-server)
//!
//! Run with: cargo test -p ridepool-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use ridepool_integration_tests::{TestContext, unique_phone};

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_full_sign_in_flow() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let user = ctx.sign_in(&phone).await;

    assert_eq!(user["phone"].as_str(), Some(phone.as_str()));
    assert_eq!(user["verified"].as_bool(), Some(true));
    assert!(user["id"].as_i64().is_some());
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_first_verification_creates_user_with_placeholder_email() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let code = ctx.latest_code(&phone).await;

    let resp = ctx
        .client
        .post(format!("{}/auth/verify-otp", ctx.base_url))
        .json(&json!({ "phone": phone, "code": code }))
        .send()
        .await
        .expect("verify-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // An unseen phone mints an account on verification.
    let body: Value = resp.json().await.expect("verify body was not JSON");
    assert_eq!(body["isNewUser"].as_bool(), Some(true));
    assert!(body["userId"].as_i64().is_some());

    // The fresh account carries the synthesized email until the user sets one.
    let resp = ctx
        .client
        .post(format!("{}/auth/login", ctx.base_url))
        .json(&json!({ "phone": phone, "code": code }))
        .send()
        .await
        .expect("login failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let user: Value = resp.json().await.expect("login body was not JSON");
    let expected_email = format!("{}@ridepool.phone", phone.trim_start_matches('+'));
    assert_eq!(user["email"].as_str(), Some(expected_email.as_str()));
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_verify_consumes_code_on_first_use() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let code = ctx.latest_code(&phone).await;

    let resp = ctx
        .client
        .post(format!("{}/auth/verify-otp", ctx.base_url))
        .json(&json!({ "phone": phone, "code": code }))
        .send()
        .await
        .expect("verify-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Verification flips the code to verified, so it no longer matches.
    let resp = ctx
        .client
        .post(format!("{}/auth/verify-otp", ctx.base_url))
        .json(&json!({ "phone": phone, "code": code }))
        .send()
        .await
        .expect("second verify-otp failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_login_deletes_codes_so_replay_fails() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    // Capture the code before sign_in consumes it.
    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let code = ctx.latest_code(&phone).await;

    for path in ["/auth/verify-otp", "/auth/login"] {
        let resp = ctx
            .client
            .post(format!("{}{path}", ctx.base_url))
            .json(&json!({ "phone": phone, "code": code }))
            .send()
            .await
            .expect("request failed");
        assert!(resp.status().is_success(), "{path} returned {}", resp.status());
    }

    // Login deleted every code for the phone; replaying the exchange fails.
    let resp = ctx
        .client
        .post(format!("{}/auth/login", ctx.base_url))
        .json(&json!({ "phone": phone, "code": code }))
        .send()
        .await
        .expect("replay request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_verify_rejects_wrong_code() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .post(format!("{}/auth/verify-otp", ctx.base_url))
        .json(&json!({ "phone": phone, "code": "000000" }))
        .send()
        .await
        .expect("verify-otp failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("error body was not JSON");
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_reissue_invalidates_previous_code() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("first send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let first_code = ctx.latest_code(&phone).await;

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("second send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let second_code = ctx.latest_code(&phone).await;

    // Issuing a new code deletes the unverified predecessor. Codes can
    // collide by chance, so only assert the stale one is rejected when they
    // differ.
    if first_code != second_code {
        let resp = ctx
            .client
            .post(format!("{}/auth/verify-otp", ctx.base_url))
            .json(&json!({ "phone": phone, "code": first_code }))
            .send()
            .await
            .expect("verify-otp failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_login_requires_prior_verification() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({ "phone": phone }))
        .send()
        .await
        .expect("send-otp failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Skipping verify-otp: the session exchange only accepts verified codes.
    let code = ctx.latest_code(&phone).await;
    let resp = ctx
        .client
        .post(format!("{}/auth/login", ctx.base_url))
        .json(&json!({ "phone": phone, "code": code }))
        .send()
        .await
        .expect("login failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_send_otp_rate_limited_on_sixth_request() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();

    let mut last_status = StatusCode::OK;
    for _ in 0..6 {
        let resp = ctx
            .client
            .post(format!("{}/auth/send-otp", ctx.base_url))
            .json(&json!({ "phone": phone }))
            .send()
            .await
            .expect("send-otp failed");
        last_status = resp.status();
    }

    assert_eq!(last_status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_send_otp_requires_phone() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(format!("{}/auth/send-otp", ctx.base_url))
        .json(&json!({}))
        .send()
        .await
        .expect("send-otp failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_logout_clears_session() {
    let ctx = TestContext::new().await;
    let phone = unique_phone();
    ctx.sign_in(&phone).await;

    let resp = ctx
        .client
        .get(format!("{}/bookings", ctx.base_url))
        .send()
        .await
        .expect("bookings list failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .post(format!("{}/auth/logout", ctx.base_url))
        .send()
        .await
        .expect("logout failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(format!("{}/bookings", ctx.base_url))
        .send()
        .await
        .expect("bookings list failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
