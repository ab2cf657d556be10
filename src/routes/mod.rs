pub mod auth_routes;
pub mod driver_routes;
pub mod message_routes;
pub mod ride_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::realtime;
use crate::state::AppState;

/// Router completo de la aplicación, con CORS y tracing ya aplicados
pub fn create_app_router(state: AppState) -> Router {
    // CORS permisivo solo en desarrollo
    let cors = if state.config.is_development() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(state.config.cors_origins.clone())
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/ws", get(realtime::ws::ws_handler))
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/api/rides", ride_routes::create_ride_router(state.clone()))
        .nest(
            "/api/drivers",
            driver_routes::create_driver_router(state.clone()),
        )
        .nest(
            "/api/messages",
            message_routes::create_message_router(state.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "ride-hailing-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
