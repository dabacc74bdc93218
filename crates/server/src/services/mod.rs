//! Business services for the Ridepool API.
//!
//! Services orchestrate repositories and external collaborators; the current
//! user is always threaded in as an explicit parameter, never read from
//! ambient state, so each service is testable without the HTTP layer.

pub mod auth;
pub mod bookings;
pub mod sms;

pub use auth::{AuthError, AuthService};
pub use bookings::{BookingError, BookingService};
pub use sms::{SmsClient, SmsError};
