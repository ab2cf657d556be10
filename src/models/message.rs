//! Modelo de mensajes de chat por viaje

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserRole;

/// Mensaje de chat - mapea exactamente a la tabla ride_messages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RideMessage {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub sender_id: Uuid,
    #[sqlx(try_from = "String")]
    pub sender_role: UserRole,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
