use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use crate::controllers::message_controller::MessageController;
use crate::dto::message_dto::{MessageResponse, SendMessageRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::services::ride_lifecycle::Actor;
use crate::state::AppState;
use crate::utils::errors::AppError;
use uuid::Uuid;

pub fn create_message_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(send_message))
        .route("/ride/:ride_id", get(list_messages))
        .route("/:id/read", put(mark_read))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn actor(auth: AuthenticatedUser) -> Actor {
    Actor {
        id: auth.user_id,
        role: auth.role,
    }
}

async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), AppError> {
    let controller = MessageController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.send(actor(auth), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let controller = MessageController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.list(actor(auth), ride_id).await?;
    Ok(Json(response))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let controller = MessageController::new(state.pool.clone(), state.rooms.clone());
    let response = controller.mark_read(actor(auth), id).await?;
    Ok(Json(response))
}
