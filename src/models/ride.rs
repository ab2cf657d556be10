//! Modelo de Ride
//!
//! Este módulo contiene el struct Ride que mapea a la tabla rides,
//! junto con el enum de estados del viaje.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UnknownVariant;

/// Estados del ciclo de vida de un viaje
///
/// pending → accepted → arrived → in_progress → completed
/// {pending, accepted, arrived} → cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Pending,
    Accepted,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Accepted => "accepted",
            RideStatus::Arrived => "arrived",
            RideStatus::InProgress => "in_progress",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RideStatus::Pending),
            "accepted" => Some(RideStatus::Accepted),
            "arrived" => Some(RideStatus::Arrived),
            "in_progress" => Some(RideStatus::InProgress),
            "completed" => Some(RideStatus::Completed),
            "cancelled" => Some(RideStatus::Cancelled),
            _ => None,
        }
    }

    /// Un viaje terminal ya no admite ninguna transición
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Estados desde los que todavía se permite cancelar
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            RideStatus::Pending | RideStatus::Accepted | RideStatus::Arrived
        )
    }
}

impl TryFrom<String> for RideStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RideStatus::from_str(&value).ok_or(UnknownVariant(value))
    }
}

/// Ride - mapea exactamente a la tabla rides
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ride {
    pub id: Uuid,
    pub passenger_id: Uuid,
    pub driver_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub status: RideStatus,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub pickup_address: String,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
    pub dropoff_address: String,
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
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    /// Verificar si un usuario participa en el viaje
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.passenger_id == user_id || self.driver_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            RideStatus::Pending,
            RideStatus::Accepted,
            RideStatus::Arrived,
            RideStatus::InProgress,
            RideStatus::Completed,
            RideStatus::Cancelled,
        ] {
            assert_eq!(RideStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RideStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(RideStatus::Completed.is_terminal());
        assert!(RideStatus::Cancelled.is_terminal());
        assert!(!RideStatus::Pending.is_terminal());
        assert!(!RideStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_cancellable_states() {
        assert!(RideStatus::Pending.is_cancellable());
        assert!(RideStatus::Accepted.is_cancellable());
        assert!(RideStatus::Arrived.is_cancellable());
        assert!(!RideStatus::InProgress.is_cancellable());
        assert!(!RideStatus::Completed.is_cancellable());
        assert!(!RideStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&RideStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
