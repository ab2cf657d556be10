use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{RideMessage, UserRole};

// Request para enviar un mensaje de chat
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub ride_id: Uuid,
    pub message: String,
}

// Response de mensaje para la API
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: UserRole,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<RideMessage> for MessageResponse {
    fn from(msg: RideMessage) -> Self {
        Self {
            id: msg.id,
            ride_id: msg.ride_id,
            sender_id: msg.sender_id,
            sender_role: msg.sender_role,
            message: msg.body,
            is_read: msg.is_read,
            created_at: msg.created_at,
        }
    }
}
