//! Ride route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use ridepool_core::RideId;

use crate::db::rides::{NewRide, RideRepository, RideSearch};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

/// Query parameters for `GET /rides`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    pub passengers: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchParams {
    fn into_search(self) -> RideSearch {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        RideSearch {
            origin: non_blank(self.origin),
            destination: non_blank(self.destination),
            date: self.date,
            min_seats: self.passengers.unwrap_or(1).max(1),
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Request body for `POST /rides`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub departure_time: Option<String>,
    pub seats: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

/// Search active rides with optional filters and pagination.
///
/// # Errors
///
/// 500 if the query fails.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    let search = params.into_search();
    let (page, limit) = (search.page, search.limit);

    let repo = RideRepository::new(state.pool());
    let (rides, total) = repo.search(&search).await?;

    Ok(Json(json!({
        "rides": rides,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total.unsigned_abs().div_ceil(limit.unsigned_abs()),
        },
    })))
}

/// Publish a ride with the caller as its driver.
///
/// # Errors
///
/// 401 without a session, 400 for missing or invalid fields.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateRideRequest>,
) -> Result<impl IntoResponse> {
    let ride = validate_new_ride(req)?;

    let repo = RideRepository::new(state.pool());
    let created = repo.create(user.id, &ride).await?;

    tracing::info!(ride_id = %created.id, driver_id = %user.id, "ride published");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Ride detail with its driver's summary.
///
/// # Errors
///
/// 404 for an unknown ride.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let repo = RideRepository::new(state.pool());
    let ride = repo
        .get_with_driver(RideId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    Ok(Json(ride))
}

fn validate_new_ride(req: CreateRideRequest) -> Result<NewRide> {
    let required = |s: Option<String>, field: &str| {
        s.filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
    };

    let origin = required(req.origin, "Origin")?;
    let destination = required(req.destination, "Destination")?;
    let departure_time = required(req.departure_time, "Departure time")?;
    let departure_date = req
        .departure_date
        .ok_or_else(|| AppError::BadRequest("Departure date is required".to_string()))?;

    let seats = req
        .seats
        .ok_or_else(|| AppError::BadRequest("Seats is required".to_string()))?;
    if !(1..=8).contains(&seats) {
        return Err(AppError::BadRequest(
            "Seats must be between 1 and 8".to_string(),
        ));
    }

    let price = req
        .price
        .ok_or_else(|| AppError::BadRequest("Price is required".to_string()))?;
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Price must not be negative".to_string(),
        ));
    }

    Ok(NewRide {
        origin,
        destination,
        departure_date,
        departure_time,
        seats,
        price,
        description: req.description.filter(|d| !d.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateRideRequest {
        serde_json::from_str(
            r#"{
                "origin": "Lyon",
                "destination": "Paris",
                "departureDate": "2026-09-01",
                "departureTime": "08:30",
                "seats": 3,
                "price": "25.00"
            }"#,
        )
        .expect("valid json")
    }

    #[test]
    fn test_validate_new_ride_accepts_full_request() {
        let ride = validate_new_ride(full_request()).expect("valid ride");
        assert_eq!(ride.origin, "Lyon");
        assert_eq!(ride.seats, 3);
        assert_eq!(ride.price, Decimal::new(2500, 2));
        assert!(ride.description.is_none());
    }

    #[test]
    fn test_validate_new_ride_rejects_missing_fields() {
        let mut req = full_request();
        req.origin = None;
        assert!(validate_new_ride(req).is_err());

        let mut req = full_request();
        req.destination = Some("   ".to_string());
        assert!(validate_new_ride(req).is_err());
    }

    #[test]
    fn test_validate_new_ride_rejects_bad_seats_and_price() {
        let mut req = full_request();
        req.seats = Some(0);
        assert!(validate_new_ride(req).is_err());

        let mut req = full_request();
        req.seats = Some(9);
        assert!(validate_new_ride(req).is_err());

        let mut req = full_request();
        req.price = Some(Decimal::new(-100, 2));
        assert!(validate_new_ride(req).is_err());
    }

    #[test]
    fn test_search_params_clamp_pagination() {
        let params = SearchParams {
            origin: Some(String::new()),
            destination: None,
            date: None,
            passengers: Some(0),
            page: Some(-2),
            limit: Some(500),
        };
        let search = params.into_search();
        assert!(search.origin.is_none());
        assert_eq!(search.min_seats, 1);
        assert_eq!(search.page, 1);
        assert_eq!(search.limit, MAX_PAGE_SIZE);
    }
}
