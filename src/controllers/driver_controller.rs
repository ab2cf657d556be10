use crate::dto::driver_dto::UpdateDriverStatusRequest;
use crate::dto::ApiResponse;
use crate::models::{DriverStatus, UserResponse, UserRole};
use crate::repositories::user_repository::UserRepository;
use crate::services::ride_lifecycle::Actor;
use crate::utils::errors::AppError;
use sqlx::PgPool;

pub struct DriverController {
    repository: UserRepository,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    /// Poner al conductor en línea o fuera de línea
    pub async fn update_status(
        &self,
        actor: Actor,
        request: UpdateDriverStatusRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        if actor.role != UserRole::Driver {
            return Err(AppError::Forbidden(
                "Solo los conductores pueden cambiar su disponibilidad".to_string(),
            ));
        }

        let status = if request.is_online {
            DriverStatus::Online
        } else {
            DriverStatus::Offline
        };

        let user = self
            .repository
            .update_driver_status(actor.id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;

        tracing::info!(
            "🚦 Conductor {} ahora {}",
            user.id,
            user.driver_status.as_str()
        );

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Disponibilidad actualizada".to_string(),
        ))
    }
}
