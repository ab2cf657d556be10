//! Lógica de negocio compartida entre controllers

pub mod fare;
pub mod ride_lifecycle;

pub use fare::{actual_duration_minutes, calculate_fare, FareBreakdown};
pub use ride_lifecycle::{authorize_transition, Actor, RideAction};
