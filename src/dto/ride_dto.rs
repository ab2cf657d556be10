use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Ride, RideStatus};

// Ubicación tal como la envía el cliente: coordenadas [lng, lat] + dirección
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RideLocation {
    pub coordinates: Vec<f64>,
    pub address: String,
}

// Request para solicitar un viaje
#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub pickup_location: RideLocation,
    pub dropoff_location: RideLocation,
    // Distancia estimada en km y duración estimada en minutos (opcionales)
    pub distance: Option<f64>,
    pub estimated_duration: Option<i32>,
    pub payment_method: Option<String>,
}

// Response de viaje para la API
#[derive(Debug, Serialize)]
pub struct RideResponse {
    pub id: Uuid,
    pub passenger_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub status: RideStatus,
    pub pickup_location: RideLocation,
    pub dropoff_location: RideLocation,
    pub distance_km: Option<Decimal>,
    pub estimated_duration_min: Option<i32>,
    pub actual_duration_min: Option<i32>,
    pub fare: Option<Decimal>,
    pub fare_breakdown: Option<serde_json::Value>,
    pub payment_method: String,
    pub accepted_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            id: ride.id,
            passenger_id: ride.passenger_id,
            driver_id: ride.driver_id,
            status: ride.status,
            pickup_location: RideLocation {
                coordinates: vec![ride.pickup_lng, ride.pickup_lat],
                address: ride.pickup_address,
            },
            dropoff_location: RideLocation {
                coordinates: vec![ride.dropoff_lng, ride.dropoff_lat],
                address: ride.dropoff_address,
            },
            distance_km: ride.distance_km,
            estimated_duration_min: ride.estimated_duration_min,
            actual_duration_min: ride.actual_duration_min,
            fare: ride.fare,
            fare_breakdown: ride.fare_breakdown,
            payment_method: ride.payment_method,
            accepted_at: ride.accepted_at,
            arrived_at: ride.arrived_at,
            started_at: ride.started_at,
            completed_at: ride.completed_at,
            cancelled_at: ride.cancelled_at,
            cancelled_by: ride.cancelled_by,
            created_at: ride.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_response_coordinates_order() {
        // El formato del cliente es [lng, lat]
        let now = Utc::now();
        let ride = Ride {
            id: Uuid::new_v4(),
            passenger_id: Uuid::new_v4(),
            driver_id: None,
            status: RideStatus::Pending,
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
        };

        let response = RideResponse::from(ride);
        assert_eq!(response.pickup_location.coordinates, vec![-74.0060, 40.7128]);
        assert_eq!(response.dropoff_location.coordinates, vec![-73.9851, 40.7589]);
    }
}
