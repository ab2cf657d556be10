//! Modelos del dominio

pub mod message;
pub mod ride;
pub mod user;

pub use message::RideMessage;
pub use ride::{Ride, RideStatus};
pub use user::{DriverStatus, User, UserResponse, UserRole};
