//! Módulo de acceso a la base de datos

pub mod connection;
pub mod schema;

pub use connection::create_pool;
pub use schema::ensure_schema;
