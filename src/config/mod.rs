//! Módulo de configuración de la aplicación

pub mod environment;

pub use environment::EnvironmentConfig;
