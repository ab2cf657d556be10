//! Backend de ride-hailing: ciclo de vida de viajes, chat por viaje
//! en tiempo real y cálculo de tarifas.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;
