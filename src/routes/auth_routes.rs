use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::middleware::rate_limit::{rate_limit_middleware, RateLimitState};
use crate::models::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_auth_router(state: AppState) -> Router<AppState> {
    // Registro y login comparten la ventana de rate limit por IP
    let rate_limit = RateLimitState::new(&state.config);

    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    let protected = Router::new()
        .route("/me", get(get_profile))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let controller = AuthController::new(
        state.pool.clone(),
        JwtConfig::from_env_config(&state.config),
    );
    let response = controller.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(
        state.pool.clone(),
        JwtConfig::from_env_config(&state.config),
    );
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = AuthController::new(
        state.pool.clone(),
        JwtConfig::from_env_config(&state.config),
    );
    let response = controller.get_profile(auth.user_id).await?;
    Ok(Json(response))
}
