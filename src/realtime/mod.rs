//! Canal en tiempo real: salas por viaje sobre WebSocket

pub mod events;
pub mod rooms;
pub mod ws;

pub use events::{ClientEvent, RideEvent};
pub use rooms::RoomRegistry;
