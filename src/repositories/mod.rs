//! Acceso a datos - un repository por tabla

pub mod message_repository;
pub mod ride_repository;
pub mod user_repository;

pub use message_repository::MessageRepository;
pub use ride_repository::{NewRide, RideRepository};
pub use user_repository::UserRepository;
