use axum::{extract::State, middleware, routing::put, Extension, Json, Router};
use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::UpdateDriverStatusRequest;
use crate::dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::models::UserResponse;
use crate::services::ride_lifecycle::Actor;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/status", put(update_status))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateDriverStatusRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller
        .update_status(
            Actor {
                id: auth.user_id,
                role: auth.role,
            },
            request,
        )
        .await?;
    Ok(Json(response))
}
