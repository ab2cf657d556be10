use crate::dto::ride_dto::{CreateRideRequest, RideLocation, RideResponse};
use crate::dto::ApiResponse;
use crate::models::{DriverStatus, Ride, UserRole};
use crate::realtime::events::RideEvent;
use crate::realtime::rooms::RoomRegistry;
use crate::repositories::ride_repository::{NewRide, RideRepository};
use crate::repositories::user_repository::UserRepository;
use crate::services::fare::{actual_duration_minutes, calculate_fare};
use crate::services::ride_lifecycle::{authorize_transition, Actor, RideAction};
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_coordinates, validate_not_empty, validate_positive};
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RideController {
    rides: RideRepository,
    users: UserRepository,
    rooms: RoomRegistry,
}

impl RideController {
    pub fn new(pool: PgPool, rooms: RoomRegistry) -> Self {
        Self {
            rides: RideRepository::new(pool.clone()),
            users: UserRepository::new(pool),
            rooms,
        }
    }

    /// Solicitar un viaje nuevo (solo pasajeros)
    pub async fn request_ride(
        &self,
        actor: Actor,
        request: CreateRideRequest,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        if actor.role != UserRole::Passenger {
            return Err(AppError::Forbidden(
                "Solo los pasajeros pueden solicitar viajes".to_string(),
            ));
        }

        let (pickup_lat, pickup_lng) = parse_location(&request.pickup_location, "origen")?;
        let (dropoff_lat, dropoff_lng) = parse_location(&request.dropoff_location, "destino")?;

        let distance_km = match request.distance {
            Some(d) => {
                validate_positive(d).map_err(|_| {
                    AppError::BadRequest("La distancia debe ser positiva".to_string())
                })?;
                let decimal = Decimal::from_f64(d)
                    .ok_or_else(|| AppError::BadRequest("Distancia inválida".to_string()))?;
                Some(decimal.round_dp(2))
            }
            None => None,
        };

        if let Some(minutes) = request.estimated_duration {
            validate_positive(minutes).map_err(|_| {
                AppError::BadRequest("La duración estimada debe ser positiva".to_string())
            })?;
        }

        let payment_method = request.payment_method.unwrap_or_else(|| "cash".to_string());
        if !matches!(payment_method.as_str(), "cash" | "card") {
            return Err(AppError::BadRequest(
                "Método de pago inválido (cash | card)".to_string(),
            ));
        }

        // Un pasajero no puede tener dos viajes en curso
        if self.rides.has_active_ride_as_passenger(actor.id).await? {
            return Err(AppError::Conflict(
                "Ya tenés un viaje en curso".to_string(),
            ));
        }

        // Tarifa estimada solo cuando hay datos para estimarla; si no,
        // queda en NULL hasta completar el viaje
        let (fare, fare_breakdown) =
            if distance_km.is_some() || request.estimated_duration.is_some() {
                let breakdown = calculate_fare(distance_km, request.estimated_duration);
                let value = serde_json::to_value(&breakdown)
                    .map_err(|e| AppError::Internal(format!("Error serializando tarifa: {}", e)))?;
                (Some(breakdown.total), Some(value))
            } else {
                (None, None)
            };

        let ride = self
            .rides
            .create(NewRide {
                passenger_id: actor.id,
                pickup_lat,
                pickup_lng,
                pickup_address: request.pickup_location.address.trim().to_string(),
                dropoff_lat,
                dropoff_lng,
                dropoff_address: request.dropoff_location.address.trim().to_string(),
                distance_km,
                estimated_duration_min: request.estimated_duration,
                fare,
                fare_breakdown,
                payment_method,
            })
            .await?;

        tracing::info!("🚕 Viaje solicitado: {} por {}", ride.id, actor.id);

        Ok(ApiResponse::success_with_message(
            RideResponse::from(ride),
            "Viaje solicitado exitosamente".to_string(),
        ))
    }

    /// Aceptar un viaje pendiente (solo conductores en línea).
    ///
    /// La asignación real ocurre en un UPDATE condicional: si dos
    /// conductores aceptan a la vez, uno gana y el otro recibe 409.
    pub async fn accept(
        &self,
        actor: Actor,
        ride_id: Uuid,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        let ride = self.load_ride(ride_id).await?;
        authorize_transition(&ride, RideAction::Accept, &actor)?;

        let driver = self
            .users
            .find_by_id(actor.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;

        if driver.driver_status != DriverStatus::Online {
            return Err(AppError::Conflict(
                "Tenés que estar en línea para aceptar viajes".to_string(),
            ));
        }

        match self.rides.try_accept(ride_id, actor.id).await? {
            Some(ride) => {
                tracing::info!("✅ Viaje {} aceptado por {}", ride.id, actor.id);
                self.emit_status(&ride, actor.id).await;
                Ok(ApiResponse::success_with_message(
                    RideResponse::from(ride),
                    "Viaje aceptado".to_string(),
                ))
            }
            None => Err(self.race_lost(ride_id, RideAction::Accept).await?),
        }
    }

    /// Marcar que el conductor llegó al punto de origen
    pub async fn arrive(
        &self,
        actor: Actor,
        ride_id: Uuid,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        let ride = self.load_ride(ride_id).await?;
        authorize_transition(&ride, RideAction::Arrive, &actor)?;

        match self.rides.try_arrive(ride_id, actor.id).await? {
            Some(ride) => {
                self.emit_status(&ride, actor.id).await;
                Ok(ApiResponse::success_with_message(
                    RideResponse::from(ride),
                    "Llegada registrada".to_string(),
                ))
            }
            None => Err(self.race_lost(ride_id, RideAction::Arrive).await?),
        }
    }

    /// Iniciar el viaje con el pasajero a bordo
    pub async fn start(
        &self,
        actor: Actor,
        ride_id: Uuid,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        let ride = self.load_ride(ride_id).await?;
        authorize_transition(&ride, RideAction::Start, &actor)?;

        match self.rides.try_start(ride_id, actor.id).await? {
            Some(ride) => {
                self.emit_status(&ride, actor.id).await;
                Ok(ApiResponse::success_with_message(
                    RideResponse::from(ride),
                    "Viaje iniciado".to_string(),
                ))
            }
            None => Err(self.race_lost(ride_id, RideAction::Start).await?),
        }
    }

    /// Completar el viaje y calcular la tarifa final
    pub async fn complete(
        &self,
        actor: Actor,
        ride_id: Uuid,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        let ride = self.load_ride(ride_id).await?;
        authorize_transition(&ride, RideAction::Complete, &actor)?;

        // started_at siempre existe en un viaje in_progress
        let started_at = ride.started_at.ok_or_else(|| {
            AppError::Internal(format!("Viaje {} en curso sin started_at", ride.id))
        })?;

        let duration_min = actual_duration_minutes(started_at, Utc::now());
        let breakdown = calculate_fare(ride.distance_km, Some(duration_min));
        let fare_breakdown = serde_json::to_value(&breakdown)
            .map_err(|e| AppError::Internal(format!("Error serializando tarifa: {}", e)))?;

        match self
            .rides
            .try_complete(ride_id, actor.id, duration_min, breakdown.total, fare_breakdown)
            .await?
        {
            Some(ride) => {
                tracing::info!(
                    "🏁 Viaje {} completado: {} min, tarifa {}",
                    ride.id,
                    duration_min,
                    breakdown.total
                );
                self.emit_status(&ride, actor.id).await;
                Ok(ApiResponse::success_with_message(
                    RideResponse::from(ride),
                    "Viaje completado".to_string(),
                ))
            }
            None => Err(self.race_lost(ride_id, RideAction::Complete).await?),
        }
    }

    /// Cancelar un viaje que todavía no está en curso
    pub async fn cancel(
        &self,
        actor: Actor,
        ride_id: Uuid,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        let ride = self.load_ride(ride_id).await?;
        authorize_transition(&ride, RideAction::Cancel, &actor)?;

        match self.rides.try_cancel(ride_id, actor.role.as_str()).await? {
            Some(ride) => {
                tracing::info!(
                    "🚫 Viaje {} cancelado por {}",
                    ride.id,
                    actor.role.as_str()
                );
                self.emit_status(&ride, actor.id).await;
                Ok(ApiResponse::success_with_message(
                    RideResponse::from(ride),
                    "Viaje cancelado".to_string(),
                ))
            }
            None => Err(self.race_lost(ride_id, RideAction::Cancel).await?),
        }
    }

    /// Detalle de un viaje (solo participantes)
    pub async fn get_by_id(&self, actor: Actor, ride_id: Uuid) -> Result<RideResponse, AppError> {
        let ride = self.load_ride(ride_id).await?;

        if !ride.is_participant(actor.id) {
            return Err(AppError::Forbidden(
                "No sos participante de este viaje".to_string(),
            ));
        }

        Ok(RideResponse::from(ride))
    }

    /// Viajes terminados del usuario autenticado
    pub async fn history(&self, actor: Actor) -> Result<Vec<RideResponse>, AppError> {
        let rides = self.rides.history_for_user(actor.id).await?;
        Ok(rides.into_iter().map(RideResponse::from).collect())
    }

    /// Viaje en curso del usuario autenticado, el más reciente si
    /// hubiera más de uno. 404 cuando no hay ninguno.
    pub async fn active(&self, actor: Actor) -> Result<RideResponse, AppError> {
        let ride = self
            .rides
            .active_for_user(actor.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("No tenés ningún viaje activo".to_string()))?;

        Ok(RideResponse::from(ride))
    }

    /// Viajes pendientes sin conductor asignado (solo conductores)
    pub async fn available(&self, actor: Actor) -> Result<Vec<RideResponse>, AppError> {
        if actor.role != UserRole::Driver {
            return Err(AppError::Forbidden(
                "Solo los conductores pueden ver los viajes disponibles".to_string(),
            ));
        }

        let rides = self.rides.available().await?;
        Ok(rides.into_iter().map(RideResponse::from).collect())
    }

    async fn load_ride(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        self.rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Viaje no encontrado".to_string()))
    }

    /// El UPDATE condicional no afectó filas: releer para distinguir
    /// viaje desaparecido de transición perdida contra otro actor.
    async fn race_lost(&self, ride_id: Uuid, action: RideAction) -> Result<AppError, AppError> {
        match self.rides.current_status(ride_id).await? {
            Some(status) => Ok(AppError::Conflict(format!(
                "No se puede hacer '{}' desde el estado '{}'",
                action.as_str(),
                status.as_str()
            ))),
            None => Ok(AppError::NotFound("Viaje no encontrado".to_string())),
        }
    }

    async fn emit_status(&self, ride: &Ride, actor_id: Uuid) {
        // Difusión best-effort: una sala vacía no es un error
        let delivered = self
            .rooms
            .emit(
                ride.id,
                RideEvent::RideStatusUpdate {
                    ride_id: ride.id,
                    new_status: ride.status.as_str().to_string(),
                    actor_id,
                },
            )
            .await;
        tracing::debug!(
            "📡 Estado '{}' del viaje {} difundido a {} receptores",
            ride.status.as_str(),
            ride.id,
            delivered
        );
    }
}

/// Extraer (lat, lng) de una ubicación del cliente, formato [lng, lat]
fn parse_location(location: &RideLocation, label: &str) -> Result<(f64, f64), AppError> {
    if location.coordinates.len() != 2 {
        return Err(AppError::BadRequest(format!(
            "Las coordenadas de {} deben ser [lng, lat]",
            label
        )));
    }

    let lng = location.coordinates[0];
    let lat = location.coordinates[1];

    validate_coordinates(lat, lng).map_err(|_| {
        AppError::BadRequest(format!("Coordenadas de {} fuera de rango", label))
    })?;

    validate_not_empty(&location.address).map_err(|_| {
        AppError::BadRequest(format!("La dirección de {} es requerida", label))
    })?;

    Ok((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lng: f64, lat: f64, address: &str) -> RideLocation {
        RideLocation {
            coordinates: vec![lng, lat],
            address: address.to_string(),
        }
    }

    #[test]
    fn test_parse_location_happy_path() {
        let loc = location(-74.0060, 40.7128, "Times Square");
        let (lat, lng) = parse_location(&loc, "origen").unwrap();
        assert_eq!(lat, 40.7128);
        assert_eq!(lng, -74.0060);
    }

    #[test]
    fn test_parse_location_rejects_wrong_arity() {
        let loc = RideLocation {
            coordinates: vec![-74.0060],
            address: "Times Square".to_string(),
        };
        assert!(matches!(
            parse_location(&loc, "origen"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_location_rejects_out_of_range() {
        // La latitud viaja en la segunda posición
        let loc = location(-74.0060, 95.0, "Times Square");
        assert!(matches!(
            parse_location(&loc, "origen"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_location_rejects_empty_address() {
        let loc = location(-74.0060, 40.7128, "   ");
        assert!(matches!(
            parse_location(&loc, "destino"),
            Err(AppError::BadRequest(_))
        ));
    }
}
