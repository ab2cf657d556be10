use crate::models::{RideMessage, UserRole};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        ride_id: Uuid,
        sender_id: Uuid,
        sender_role: UserRole,
        body: &str,
    ) -> Result<RideMessage, AppError> {
        let id = Uuid::new_v4();

        let message = sqlx::query_as::<_, RideMessage>(
            r#"
            INSERT INTO ride_messages (id, ride_id, sender_id, sender_role, body, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ride_id)
        .bind(sender_id)
        .bind(sender_role.as_str())
        .bind(body)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Historial del chat, del más antiguo al más reciente. El orden
    /// es estable aunque dos mensajes compartan timestamp.
    pub async fn list_by_ride(&self, ride_id: Uuid) -> Result<Vec<RideMessage>, AppError> {
        let messages = sqlx::query_as::<_, RideMessage>(
            "SELECT * FROM ride_messages WHERE ride_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(ride_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RideMessage>, AppError> {
        let message = sqlx::query_as::<_, RideMessage>(
            "SELECT * FROM ride_messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Option<RideMessage>, AppError> {
        let message = sqlx::query_as::<_, RideMessage>(
            "UPDATE ride_messages SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }
}
