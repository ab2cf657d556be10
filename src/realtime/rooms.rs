//! Salas de difusión por viaje
//!
//! Cada viaje tiene una sala lógica. La membresía tiene ciclo de vida
//! explícito: se crea al unirse, se elimina al salir o desconectarse,
//! y la sala se poda cuando queda vacía. La entrega es best-effort,
//! como mucho una vez, sin durabilidad propia.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::events::RideEvent;

/// Capacidad del buffer de cada sala antes de que un receptor lento
/// empiece a perder eventos
const ROOM_CAPACITY: usize = 256;

type RoomsMap = Arc<RwLock<HashMap<Uuid, broadcast::Sender<RideEvent>>>>;

/// Registro de salas: viaje → canal de difusión
pub struct RoomRegistry {
    rooms: RoomsMap,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Unirse a la sala de un viaje. La sala se crea si no existía.
    pub async fn join(&self, ride_id: Uuid) -> broadcast::Receiver<RideEvent> {
        let mut rooms = self.rooms.write().await;
        let sender = rooms
            .entry(ride_id)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0);
        sender.subscribe()
    }

    /// Difundir un evento a todos los miembros actuales de la sala.
    ///
    /// Devuelve a cuántos receptores llegó. Emitir hacia una sala
    /// inexistente o vacía no es un error: devuelve 0 y no crea nada.
    pub async fn emit(&self, ride_id: Uuid, event: RideEvent) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(&ride_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Cantidad de miembros actuales de la sala
    pub async fn member_count(&self, ride_id: Uuid) -> usize {
        let rooms = self.rooms.read().await;
        rooms
            .get(&ride_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Eliminar la sala si ya no tiene miembros
    pub async fn prune_if_empty(&self, ride_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        if let Some(sender) = rooms.get(&ride_id) {
            if sender.receiver_count() == 0 {
                rooms.remove(&ride_id);
            }
        }
    }

    /// Cantidad de salas vivas
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RoomRegistry {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing_event(ride_id: Uuid) -> RideEvent {
        RideEvent::UserTyping {
            ride_id,
            user_id: Uuid::new_v4(),
            is_typing: true,
        }
    }

    #[tokio::test]
    async fn test_join_then_emit_delivers() {
        let registry = RoomRegistry::new();
        let ride_id = Uuid::new_v4();

        let mut rx = registry.join(ride_id).await;
        let delivered = registry.emit(ride_id, typing_event(ride_id)).await;

        assert_eq!(delivered, 1);
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, RideEvent::UserTyping { .. }));
    }

    #[tokio::test]
    async fn test_emit_without_members_is_fire_and_forget() {
        let registry = RoomRegistry::new();
        let ride_id = Uuid::new_v4();

        let delivered = registry.emit(ride_id, typing_event(ride_id)).await;

        assert_eq!(delivered, 0);
        // Emitir no crea salas
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_all_members_receive() {
        let registry = RoomRegistry::new();
        let ride_id = Uuid::new_v4();

        let mut rx1 = registry.join(ride_id).await;
        let mut rx2 = registry.join(ride_id).await;

        let delivered = registry.emit(ride_id, typing_event(ride_id)).await;
        assert_eq!(delivered, 2);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let ride_a = Uuid::new_v4();
        let ride_b = Uuid::new_v4();

        let mut rx_a = registry.join(ride_a).await;
        let mut rx_b = registry.join(ride_b).await;

        registry.emit(ride_a, typing_event(ride_a)).await;

        assert!(rx_a.recv().await.is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_member_count_and_prune() {
        let registry = RoomRegistry::new();
        let ride_id = Uuid::new_v4();

        let rx = registry.join(ride_id).await;
        assert_eq!(registry.member_count(ride_id).await, 1);
        assert_eq!(registry.room_count().await, 1);

        // Con miembros vivos la poda no hace nada
        registry.prune_if_empty(ride_id).await;
        assert_eq!(registry.room_count().await, 1);

        drop(rx);
        registry.prune_if_empty(ride_id).await;
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_events_missed_while_absent_are_not_replayed() {
        let registry = RoomRegistry::new();
        let ride_id = Uuid::new_v4();

        // Hay que tener la sala viva para que el emit llegue a alguien
        let _keeper = registry.join(ride_id).await;
        registry.emit(ride_id, typing_event(ride_id)).await;

        // Quien se une después no recibe lo emitido antes
        let mut late = registry.join(ride_id).await;
        assert!(late.try_recv().is_err());
    }
}
