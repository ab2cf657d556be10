//! Estado compartido de la aplicación
//!
//! Este módulo define el estado que se pasa a través del router de Axum.

use crate::config::environment::EnvironmentConfig;
use crate::realtime::rooms::RoomRegistry;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            pool,
            config,
            rooms: RoomRegistry::new(),
        }
    }
}
