use crate::dto::message_dto::{MessageResponse, SendMessageRequest};
use crate::dto::ApiResponse;
use crate::models::Ride;
use crate::realtime::events::{RideEvent, MAX_MESSAGE_LENGTH};
use crate::realtime::rooms::RoomRegistry;
use crate::repositories::message_repository::MessageRepository;
use crate::repositories::ride_repository::RideRepository;
use crate::services::ride_lifecycle::Actor;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct MessageController {
    messages: MessageRepository,
    rides: RideRepository,
    rooms: RoomRegistry,
}

impl MessageController {
    pub fn new(pool: PgPool, rooms: RoomRegistry) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            rides: RideRepository::new(pool),
            rooms,
        }
    }

    /// Historial del chat de un viaje, del más antiguo al más reciente
    pub async fn list(&self, actor: Actor, ride_id: Uuid) -> Result<Vec<MessageResponse>, AppError> {
        self.load_ride_as_participant(actor, ride_id).await?;

        let messages = self.messages.list_by_ride(ride_id).await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Enviar un mensaje por la API REST. Equivale al evento
    /// send-message del WebSocket: se persiste primero y después se
    /// difunde a la sala del viaje.
    pub async fn send(
        &self,
        actor: Actor,
        request: SendMessageRequest,
    ) -> Result<ApiResponse<MessageResponse>, AppError> {
        let ride = self.load_ride_as_participant(actor, request.ride_id).await?;

        // El chat de un viaje terminado queda de solo lectura
        if ride.status.is_terminal() {
            return Err(AppError::Conflict(
                "No se pueden enviar mensajes a un viaje terminado".to_string(),
            ));
        }

        let body = request.message.trim();
        if body.is_empty() {
            return Err(AppError::BadRequest(
                "El mensaje no puede estar vacío".to_string(),
            ));
        }
        if body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::BadRequest(format!(
                "El mensaje supera el máximo de {} caracteres",
                MAX_MESSAGE_LENGTH
            )));
        }

        let saved = self
            .messages
            .create(request.ride_id, actor.id, actor.role, body)
            .await?;

        self.rooms
            .emit(request.ride_id, RideEvent::from_message(&saved))
            .await;

        Ok(ApiResponse::success_with_message(
            MessageResponse::from(saved),
            "Mensaje enviado".to_string(),
        ))
    }

    /// Marcar un mensaje como leído y avisar a la sala
    pub async fn mark_read(
        &self,
        actor: Actor,
        message_id: Uuid,
    ) -> Result<ApiResponse<MessageResponse>, AppError> {
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mensaje no encontrado".to_string()))?;

        self.load_ride_as_participant(actor, message.ride_id).await?;

        // El emisor no confirma la lectura de su propio mensaje
        if message.sender_id == actor.id {
            return Err(AppError::Forbidden(
                "No podés marcar como leído tu propio mensaje".to_string(),
            ));
        }

        let updated = self
            .messages
            .mark_read(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mensaje no encontrado".to_string()))?;

        self.rooms
            .emit(
                updated.ride_id,
                RideEvent::MessageReadReceipt {
                    ride_id: updated.ride_id,
                    message_id: updated.id,
                },
            )
            .await;

        Ok(ApiResponse::success_with_message(
            MessageResponse::from(updated),
            "Mensaje marcado como leído".to_string(),
        ))
    }

    async fn load_ride_as_participant(
        &self,
        actor: Actor,
        ride_id: Uuid,
    ) -> Result<Ride, AppError> {
        let ride = self
            .rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Viaje no encontrado".to_string()))?;

        if !ride.is_participant(actor.id) {
            return Err(AppError::Forbidden(
                "No sos participante de este viaje".to_string(),
            ));
        }

        Ok(ride)
    }
}
