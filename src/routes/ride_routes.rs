use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use crate::controllers::ride_controller::RideController;
use crate::dto::ride_dto::{CreateRideRequest, RideResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::services::ride_lifecycle::Actor;
use crate::state::AppState;
use crate::utils::errors::AppError;
use uuid::Uuid;

pub fn create_ride_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/request", post(request_ride))
        .route("/history", get(ride_history))
        .route("/active", get(active_ride))
        .route("/available", get(available_rides))
        .route("/:id", get(get_ride))
        .route("/:id/accept", post(accept_ride))
        .route("/:id/arrive", post(arrive_ride))
        .route("/:id/start", post(start_ride))
        .route("/:id/complete", post(complete_ride))
        .route("/:id/cancel", post(cancel_ride))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn actor(auth: AuthenticatedUser) -> Actor {
    Actor {
        id: auth.user_id,
        role: auth.role,
    }
}

async fn request_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RideResponse>>), AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.request_ride(actor(auth), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn accept_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.accept(actor(auth), id).await?;
    Ok(Json(response))
}

async fn arrive_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.arrive(actor(auth), id).await?;
    Ok(Json(response))
}

async fn start_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.start(actor(auth), id).await?;
    Ok(Json(response))
}

async fn complete_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.complete(actor(auth), id).await?;
    Ok(Json(response))
}

async fn cancel_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.cancel(actor(auth), id).await?;
    Ok(Json(response))
}

async fn get_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideResponse>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.get_by_id(actor(auth), id).await?;
    Ok(Json(response))
}

async fn ride_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.history(actor(auth)).await?;
    Ok(Json(response))
}

async fn active_ride(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<RideResponse>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.active(actor(auth)).await?;
    Ok(Json(response))
}

async fn available_rides(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.available(actor(auth)).await?;
    Ok(Json(response))
}
