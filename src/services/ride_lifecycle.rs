//! Máquina de estados del ciclo de vida de un viaje
//!
//! Todas las transiciones pasan por una única tabla: (estado actual,
//! acción, actor) → nuevo estado o rechazo. Los handlers HTTP no
//! re-derivan permisos por su cuenta.

use uuid::Uuid;

use crate::models::{Ride, RideStatus, UserRole};
use crate::utils::errors::AppError;

/// Acciones que mutan el estado de un viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideAction {
    Accept,
    Arrive,
    Start,
    Complete,
    Cancel,
}

impl RideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideAction::Accept => "accept",
            RideAction::Arrive => "arrive",
            RideAction::Start => "start",
            RideAction::Complete => "complete",
            RideAction::Cancel => "cancel",
        }
    }
}

/// Identidad del usuario que solicita la transición
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

/// Autorizar una transición y devolver el estado destino.
///
/// El orden de los chequeos es parte del contrato:
/// - accept: primero rol, después estado
/// - arrive/start/complete: primero conductor asignado, sin importar
///   el estado del viaje, después estado predecesor
/// - cancel: primero estado (un viaje terminal siempre es conflicto),
///   después participación
pub fn authorize_transition(
    ride: &Ride,
    action: RideAction,
    actor: &Actor,
) -> Result<RideStatus, AppError> {
    match action {
        RideAction::Accept => {
            if actor.role != UserRole::Driver {
                return Err(AppError::Forbidden(
                    "Solo los conductores pueden aceptar viajes".to_string(),
                ));
            }
            if ride.status != RideStatus::Pending {
                return Err(AppError::Conflict(format!(
                    "El viaje ya no está disponible (estado actual: {})",
                    ride.status.as_str()
                )));
            }
            Ok(RideStatus::Accepted)
        }

        RideAction::Arrive | RideAction::Start | RideAction::Complete => {
            if ride.driver_id != Some(actor.id) {
                return Err(AppError::Forbidden(
                    "Solo el conductor asignado puede actualizar este viaje".to_string(),
                ));
            }

            let (required, next) = match action {
                RideAction::Arrive => (RideStatus::Accepted, RideStatus::Arrived),
                RideAction::Start => (RideStatus::Arrived, RideStatus::InProgress),
                RideAction::Complete => (RideStatus::InProgress, RideStatus::Completed),
                _ => unreachable!(),
            };

            if ride.status != required {
                return Err(AppError::Conflict(format!(
                    "No se puede hacer '{}' desde el estado '{}'",
                    action.as_str(),
                    ride.status.as_str()
                )));
            }
            Ok(next)
        }

        RideAction::Cancel => {
            if !ride.status.is_cancellable() {
                return Err(AppError::Conflict(format!(
                    "El viaje no se puede cancelar (estado actual: {})",
                    ride.status.as_str()
                )));
            }
            if !ride.is_participant(actor.id) {
                return Err(AppError::Forbidden(
                    "Solo el pasajero o el conductor asignado pueden cancelar el viaje"
                        .to_string(),
                ));
            }
            Ok(RideStatus::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ALL_STATUSES: [RideStatus; 6] = [
        RideStatus::Pending,
        RideStatus::Accepted,
        RideStatus::Arrived,
        RideStatus::InProgress,
        RideStatus::Completed,
        RideStatus::Cancelled,
    ];

    fn make_ride(status: RideStatus, passenger_id: Uuid, driver_id: Option<Uuid>) -> Ride {
        let now = Utc::now();
        Ride {
            id: Uuid::new_v4(),
            passenger_id,
            driver_id,
            status,
            pickup_lat: 40.7128,
            pickup_lng: -74.0060,
            pickup_address: "Times Square".to_string(),
            dropoff_lat: 40.7589,
            dropoff_lng: -73.9851,
            dropoff_address: "Central Park".to_string(),
            distance_km: None,
            estimated_duration_min: None,
            actual_duration_min: None,
            fare: None,
            fare_breakdown: None,
            payment_method: "cash".to_string(),
            accepted_at: None,
            arrived_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn driver_actor(id: Uuid) -> Actor {
        Actor {
            id,
            role: UserRole::Driver,
        }
    }

    fn passenger_actor(id: Uuid) -> Actor {
        Actor {
            id,
            role: UserRole::Passenger,
        }
    }

    #[test]
    fn test_accept_happy_path() {
        let ride = make_ride(RideStatus::Pending, Uuid::new_v4(), None);
        let driver = driver_actor(Uuid::new_v4());

        let next = authorize_transition(&ride, RideAction::Accept, &driver).unwrap();
        assert_eq!(next, RideStatus::Accepted);
    }

    #[test]
    fn test_accept_rejects_passengers_before_checking_state() {
        // Un pasajero recibe 403 incluso si el viaje ya no está pending
        let passenger_id = Uuid::new_v4();
        for status in ALL_STATUSES {
            let ride = make_ride(status, passenger_id, None);
            let result =
                authorize_transition(&ride, RideAction::Accept, &passenger_actor(passenger_id));
            assert!(matches!(result, Err(AppError::Forbidden(_))), "{:?}", status);
        }
    }

    #[test]
    fn test_accept_conflicts_when_not_pending() {
        let driver = driver_actor(Uuid::new_v4());
        for status in ALL_STATUSES {
            if status == RideStatus::Pending {
                continue;
            }
            let ride = make_ride(status, Uuid::new_v4(), Some(Uuid::new_v4()));
            let result = authorize_transition(&ride, RideAction::Accept, &driver);
            assert!(matches!(result, Err(AppError::Conflict(_))), "{:?}", status);
        }
    }

    #[test]
    fn test_driver_progression() {
        let driver_id = Uuid::new_v4();
        let driver = driver_actor(driver_id);
        let passenger_id = Uuid::new_v4();

        let accepted = make_ride(RideStatus::Accepted, passenger_id, Some(driver_id));
        assert_eq!(
            authorize_transition(&accepted, RideAction::Arrive, &driver).unwrap(),
            RideStatus::Arrived
        );

        let arrived = make_ride(RideStatus::Arrived, passenger_id, Some(driver_id));
        assert_eq!(
            authorize_transition(&arrived, RideAction::Start, &driver).unwrap(),
            RideStatus::InProgress
        );

        let in_progress = make_ride(RideStatus::InProgress, passenger_id, Some(driver_id));
        assert_eq!(
            authorize_transition(&in_progress, RideAction::Complete, &driver).unwrap(),
            RideStatus::Completed
        );
    }

    #[test]
    fn test_progression_rejects_non_assigned_actor_in_any_state() {
        // Cualquiera que no sea el conductor asignado recibe 403,
        // sin importar el estado del viaje
        let assigned = Uuid::new_v4();
        let passenger_id = Uuid::new_v4();
        let stranger = driver_actor(Uuid::new_v4());
        let passenger = passenger_actor(passenger_id);

        for status in ALL_STATUSES {
            for action in [RideAction::Arrive, RideAction::Start, RideAction::Complete] {
                let ride = make_ride(status, passenger_id, Some(assigned));
                assert!(matches!(
                    authorize_transition(&ride, action, &stranger),
                    Err(AppError::Forbidden(_))
                ));
                assert!(matches!(
                    authorize_transition(&ride, action, &passenger),
                    Err(AppError::Forbidden(_))
                ));
            }
        }
    }

    #[test]
    fn test_progression_rejects_when_no_driver_assigned() {
        // Con el viaje todavía pending nadie es "conductor asignado"
        let ride = make_ride(RideStatus::Pending, Uuid::new_v4(), None);
        let driver = driver_actor(Uuid::new_v4());

        for action in [RideAction::Arrive, RideAction::Start, RideAction::Complete] {
            assert!(matches!(
                authorize_transition(&ride, action, &driver),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_progression_conflicts_on_wrong_state() {
        let driver_id = Uuid::new_v4();
        let driver = driver_actor(driver_id);
        let passenger_id = Uuid::new_v4();

        // Saltarse un paso siempre es conflicto
        let accepted = make_ride(RideStatus::Accepted, passenger_id, Some(driver_id));
        assert!(matches!(
            authorize_transition(&accepted, RideAction::Start, &driver),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            authorize_transition(&accepted, RideAction::Complete, &driver),
            Err(AppError::Conflict(_))
        ));

        // Retroceder también
        let in_progress = make_ride(RideStatus::InProgress, passenger_id, Some(driver_id));
        assert!(matches!(
            authorize_transition(&in_progress, RideAction::Arrive, &driver),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_cancel_allowed_states_and_actors() {
        let passenger_id = Uuid::new_v4();
        let driver_id = Uuid::new_v4();

        // Pending: solo existe el pasajero
        let pending = make_ride(RideStatus::Pending, passenger_id, None);
        assert_eq!(
            authorize_transition(&pending, RideAction::Cancel, &passenger_actor(passenger_id))
                .unwrap(),
            RideStatus::Cancelled
        );

        // Accepted y arrived: pasajero o conductor asignado
        for status in [RideStatus::Accepted, RideStatus::Arrived] {
            let ride = make_ride(status, passenger_id, Some(driver_id));
            assert!(
                authorize_transition(&ride, RideAction::Cancel, &passenger_actor(passenger_id))
                    .is_ok()
            );
            assert!(
                authorize_transition(&ride, RideAction::Cancel, &driver_actor(driver_id)).is_ok()
            );
        }
    }

    #[test]
    fn test_cancel_rejects_non_participants() {
        let ride = make_ride(RideStatus::Accepted, Uuid::new_v4(), Some(Uuid::new_v4()));
        let stranger = passenger_actor(Uuid::new_v4());

        assert!(matches!(
            authorize_transition(&ride, RideAction::Cancel, &stranger),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_cancel_terminal_is_always_conflict() {
        // Incluso para un no-participante: el estado se chequea primero
        let passenger_id = Uuid::new_v4();
        for status in [RideStatus::InProgress, RideStatus::Completed, RideStatus::Cancelled] {
            let ride = make_ride(status, passenger_id, Some(Uuid::new_v4()));
            for actor in [passenger_actor(passenger_id), passenger_actor(Uuid::new_v4())] {
                assert!(matches!(
                    authorize_transition(&ride, RideAction::Cancel, &actor),
                    Err(AppError::Conflict(_))
                ));
            }
        }
    }
}
