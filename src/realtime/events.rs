//! Protocolo de eventos del canal en tiempo real
//!
//! Un evento por línea de WebSocket, como JSON con discriminante "type".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{RideMessage, UserRole};

/// Longitud máxima de un mensaje de chat, en caracteres
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Eventos que el servidor empuja a los clientes de una sala
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RideEvent {
    /// Mensaje de chat nuevo (también se usa para el backfill al unirse)
    NewMessage {
        id: Uuid,
        ride_id: Uuid,
        sender: Uuid,
        sender_role: UserRole,
        message: String,
        timestamp: DateTime<Utc>,
    },
    /// Indicador de tipeo, efímero, nunca se persiste
    UserTyping {
        ride_id: Uuid,
        user_id: Uuid,
        is_typing: bool,
    },
    /// Confirmación de lectura de un mensaje
    MessageReadReceipt {
        ride_id: Uuid,
        message_id: Uuid,
    },
    /// Cambio de estado del viaje
    RideStatusUpdate {
        ride_id: Uuid,
        new_status: String,
        actor_id: Uuid,
    },
    /// Error dirigido a un solo cliente (nunca se difunde a la sala)
    Error { message: String },
}

impl RideEvent {
    pub fn from_message(msg: &RideMessage) -> Self {
        RideEvent::NewMessage {
            id: msg.id,
            ride_id: msg.ride_id,
            sender: msg.sender_id,
            sender_role: msg.sender_role,
            message: msg.body.clone(),
            timestamp: msg.created_at,
        }
    }
}

/// Eventos que los clientes envían por el WebSocket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRideChat { ride_id: Uuid },
    LeaveRideChat { ride_id: Uuid },
    SendMessage { ride_id: Uuid, message: String },
    Typing { ride_id: Uuid, is_typing: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_event_serialization() {
        let ride_id = Uuid::nil();

        let event = RideEvent::UserTyping {
            ride_id,
            user_id: Uuid::nil(),
            is_typing: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"user-typing","ride_id":"00000000-0000-0000-0000-000000000000","user_id":"00000000-0000-0000-0000-000000000000","is_typing":true}"#
        );

        let event = RideEvent::RideStatusUpdate {
            ride_id,
            new_status: "accepted".to_string(),
            actor_id: Uuid::nil(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"ride-status-update","ride_id":"00000000-0000-0000-0000-000000000000","new_status":"accepted","actor_id":"00000000-0000-0000-0000-000000000000"}"#
        );

        let event = RideEvent::Error {
            message: "algo salió mal".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"error","message":"algo salió mal"}"#);
    }

    #[test]
    fn test_client_event_deserialization() {
        let json = r#"{"type":"join-ride-chat","ride_id":"00000000-0000-0000-0000-000000000000"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRideChat {
                ride_id: Uuid::nil()
            }
        );

        let json = r#"{"type":"send-message","ride_id":"00000000-0000-0000-0000-000000000000","message":"hola"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ClientEvent::SendMessage { .. }));

        let json = r#"{"type":"typing","ride_id":"00000000-0000-0000-0000-000000000000","is_typing":false}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            ClientEvent::Typing {
                is_typing: false,
                ..
            }
        ));

        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"unknown"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_message_from_model() {
        let msg = RideMessage {
            id: Uuid::new_v4(),
            ride_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            sender_role: UserRole::Passenger,
            body: "¿llegás en cuánto?".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        let event = RideEvent::from_message(&msg);
        match event {
            RideEvent::NewMessage {
                id,
                sender,
                message,
                ..
            } => {
                assert_eq!(id, msg.id);
                assert_eq!(sender, msg.sender_id);
                assert_eq!(message, "¿llegás en cuánto?");
            }
            other => panic!("Evento inesperado: {:?}", other),
        }
    }
}
