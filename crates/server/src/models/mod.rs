//! Domain models for the Ridepool API.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories convert rows into them at the query boundary.

pub mod booking;
pub mod notification;
pub mod otp;
pub mod ride;
pub mod session;
pub mod user;

pub use booking::{Booking, BookingConfirmation, BookingWithRide};
pub use notification::Notification;
pub use otp::OneTimeCode;
pub use ride::{Ride, RideWithDriver};
pub use session::{CurrentUser, session_keys};
pub use user::{DriverSummary, PassengerSummary, User};
