//! Conexión WebSocket de un cliente
//!
//! Una conexión puede estar unida a varias salas a la vez. Un único
//! escritor drena todos los eventos hacia el socket; por cada sala
//! unida hay una tarea que reenvía la difusión de la sala hacia ese
//! escritor. Al salir de una sala (o al desconectarse) la tarea de
//! reenvío termina y poda la sala si quedó vacía.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{stream::StreamExt, SinkExt};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{User, UserRole};
use crate::realtime::events::{ClientEvent, RideEvent, MAX_MESSAGE_LENGTH};
use crate::realtime::rooms::RoomRegistry;
use crate::repositories::{MessageRepository, RideRepository, UserRepository};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

const OUTBOUND_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Usuario autenticado en esta conexión
#[derive(Debug, Clone, Copy)]
pub struct WsUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// GET /api/ws - upgrade autenticado al canal en tiempo real
///
/// El token puede venir en el header Authorization o, para clientes
/// de navegador que no pueden setear headers en el handshake, como
/// query param `?token=`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Result<Response, AppError> {
    let user = authenticate(&state, &headers, &query).await?;
    info!("🔌 WebSocket aceptado para usuario {}", user.id);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    query: &WsQuery,
) -> Result<WsUser, AppError> {
    let token = match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(header) => extract_token_from_header(header)?.to_string(),
        None => query
            .token
            .clone()
            .ok_or_else(|| AppError::Unauthorized("Token no proporcionado".to_string()))?,
    };

    let jwt_config = JwtConfig::from_env_config(&state.config);
    let claims = verify_token(&token, &jwt_config)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

    // El usuario debe seguir existiendo y activo
    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Usuario inactivo".to_string()));
    }

    Ok(WsUser {
        id: user.id,
        role: user.role,
    })
}

async fn handle_socket(socket: WebSocket, state: AppState, user: WsUser) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Único escritor hacia el socket
    let (tx, mut rx) = mpsc::channel::<RideEvent>(OUTBOUND_BUFFER);

    let write_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("❌ Error serializando evento: {}", e);
                    continue;
                }
            };

            if ws_sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        debug!("Tarea de escritura terminada");
    });

    // Membresías de esta conexión: viaje → señal de corte del reenvío
    let mut memberships: HashMap<Uuid, oneshot::Sender<()>> = HashMap::new();

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    handle_client_event(&state, &user, event, &tx, &mut memberships).await;
                }
                Err(_) => {
                    send_error(&tx, "Formato de mensaje inválido").await;
                }
            },
            Message::Close(_) => {
                debug!("El cliente cerró la conexión");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Binary(_) => {
                warn!("Mensaje binario inesperado");
            }
        }
    }

    // Al soltar cada señal de corte, su tarea de reenvío termina
    // y poda la sala correspondiente
    memberships.clear();
    drop(tx);
    let _ = write_task.await;

    info!("🔌 WebSocket cerrado para usuario {}", user.id);
}

/// Aplica un evento del cliente sobre las membresías de su conexión.
/// Todo lo dirigido solo a este cliente sale por `tx`; lo demás se
/// difunde a la sala.
pub async fn handle_client_event(
    state: &AppState,
    user: &WsUser,
    event: ClientEvent,
    tx: &mpsc::Sender<RideEvent>,
    memberships: &mut HashMap<Uuid, oneshot::Sender<()>>,
) {
    match event {
        ClientEvent::JoinRideChat { ride_id } => {
            if memberships.contains_key(&ride_id) {
                return;
            }

            // Solo los participantes del viaje pueden entrar a su sala
            let ride = match RideRepository::new(state.pool.clone()).find_by_id(ride_id).await {
                Ok(Some(ride)) => ride,
                Ok(None) => {
                    send_error(tx, "Viaje no encontrado").await;
                    return;
                }
                Err(e) => {
                    tracing::error!("❌ Error buscando viaje {}: {}", ride_id, e);
                    send_error(tx, "Error interno").await;
                    return;
                }
            };

            if !ride.is_participant(user.id) {
                send_error(tx, "No participás en este viaje").await;
                return;
            }

            // Suscribirse antes del backfill: lo que se difunda mientras
            // leemos el historial queda esperando en el buffer de la sala
            let room_rx = state.rooms.join(ride_id).await;

            match MessageRepository::new(state.pool.clone())
                .list_by_ride(ride_id)
                .await
            {
                Ok(history) => {
                    for msg in &history {
                        if tx.send(RideEvent::from_message(msg)).await.is_err() {
                            // Todavía no hay tarea de reenvío que pode
                            // la sala al caerse esta conexión
                            drop(room_rx);
                            state.rooms.prune_if_empty(ride_id).await;
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("❌ Error cargando historial del viaje {}: {}", ride_id, e);
                    send_error(tx, "No se pudo cargar el historial").await;
                }
            }

            let (stop_tx, stop_rx) = oneshot::channel();
            memberships.insert(ride_id, stop_tx);
            tokio::spawn(forward_room_events(
                state.rooms.clone(),
                ride_id,
                room_rx,
                tx.clone(),
                stop_rx,
            ));

            debug!("Usuario {} unido a la sala {}", user.id, ride_id);
        }

        ClientEvent::LeaveRideChat { ride_id } => {
            memberships.remove(&ride_id);
        }

        ClientEvent::SendMessage { ride_id, message } => {
            if !memberships.contains_key(&ride_id) {
                send_error(tx, "Primero hay que unirse a la sala del viaje").await;
                return;
            }

            // La sala sobrevive al cierre del viaje; el alta de
            // mensajes no. Mismo rechazo que la API REST.
            match RideRepository::new(state.pool.clone())
                .current_status(ride_id)
                .await
            {
                Ok(Some(status)) if status.is_terminal() => {
                    send_error(tx, "No se pueden enviar mensajes a un viaje terminado").await;
                    return;
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    send_error(tx, "Viaje no encontrado").await;
                    return;
                }
                Err(e) => {
                    tracing::error!("❌ Error consultando el viaje {}: {}", ride_id, e);
                    send_error(tx, "Error interno").await;
                    return;
                }
            }

            let body = message.trim();
            if body.is_empty() || body.chars().count() > MAX_MESSAGE_LENGTH {
                send_error(tx, "El mensaje debe tener entre 1 y 1000 caracteres").await;
                return;
            }

            // Persistir primero: el registro autoritativo es la base,
            // la difusión es solo una optimización de latencia
            match MessageRepository::new(state.pool.clone())
                .create(ride_id, user.id, user.role, body)
                .await
            {
                Ok(saved) => {
                    state.rooms.emit(ride_id, RideEvent::from_message(&saved)).await;
                }
                Err(e) => {
                    tracing::error!("❌ Error guardando mensaje del viaje {}: {}", ride_id, e);
                    send_error(tx, "No se pudo guardar el mensaje").await;
                }
            }
        }

        ClientEvent::Typing { ride_id, is_typing } => {
            // Efímero: nunca se persiste
            if !memberships.contains_key(&ride_id) {
                return;
            }
            state
                .rooms
                .emit(
                    ride_id,
                    RideEvent::UserTyping {
                        ride_id,
                        user_id: user.id,
                        is_typing,
                    },
                )
                .await;
        }
    }
}

async fn send_error(tx: &mpsc::Sender<RideEvent>, message: &str) {
    let _ = tx
        .send(RideEvent::Error {
            message: message.to_string(),
        })
        .await;
}

/// Reenvía la difusión de una sala hacia el escritor de la conexión
/// hasta que llegue la señal de corte o el escritor desaparezca.
async fn forward_room_events(
    rooms: RoomRegistry,
    ride_id: Uuid,
    mut room_rx: broadcast::Receiver<RideEvent>,
    tx: mpsc::Sender<RideEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            result = room_rx.recv() => match result {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Sala {}: receptor atrasado, se perdieron {} eventos", ride_id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    drop(room_rx);
    rooms.prune_if_empty(ride_id).await;
}
