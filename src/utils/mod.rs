//! Módulo de utilidades compartidas

pub mod errors;
pub mod jwt;
pub mod validation;

pub use errors::AppError;
