//! Controllers: lógica de negocio de cada recurso de la API

pub mod auth_controller;
pub mod driver_controller;
pub mod message_controller;
pub mod ride_controller;
