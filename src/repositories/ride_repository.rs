use crate::models::{Ride, RideStatus};
use crate::utils::errors::AppError;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Datos para insertar un viaje nuevo
#[derive(Debug)]
pub struct NewRide {
    pub passenger_id: Uuid,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub pickup_address: String,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
    pub dropoff_address: String,
    pub distance_km: Option<Decimal>,
    pub estimated_duration_min: Option<i32>,
    pub fare: Option<Decimal>,
    pub fare_breakdown: Option<serde_json::Value>,
    pub payment_method: String,
}

pub struct RideRepository {
    pool: PgPool,
}

impl RideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: NewRide) -> Result<Ride, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let ride = sqlx::query_as::<_, Ride>(
            r#"
            INSERT INTO rides (
                id, passenger_id, status,
                pickup_lat, pickup_lng, pickup_address,
                dropoff_lat, dropoff_lng, dropoff_address,
                distance_km, estimated_duration_min, fare, fare_breakdown,
                payment_method, created_at, updated_at
            )
            VALUES ($1, $2, 'pending', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.passenger_id)
        .bind(data.pickup_lat)
        .bind(data.pickup_lng)
        .bind(data.pickup_address)
        .bind(data.dropoff_lat)
        .bind(data.dropoff_lng)
        .bind(data.dropoff_address)
        .bind(data.distance_km)
        .bind(data.estimated_duration_min)
        .bind(data.fare)
        .bind(data.fare_breakdown)
        .bind(data.payment_method)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(ride)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ride)
    }

    /// Asignar el viaje a un conductor con un UPDATE condicional.
    ///
    /// La condición `status = 'pending' AND driver_id IS NULL` viaja en el
    /// mismo statement que el SET: dos accepts concurrentes sobre el mismo
    /// viaje producen exactamente un ganador. Devuelve None si la condición
    /// ya no se cumple.
    pub async fn try_accept(
        &self,
        ride_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            UPDATE rides
            SET status = 'accepted', driver_id = $2, accepted_at = $3, updated_at = $3
            WHERE id = $1 AND status = 'pending' AND driver_id IS NULL
            RETURNING *
            "#,
        )
        .bind(ride_id)
        .bind(driver_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ride)
    }

    pub async fn try_arrive(
        &self,
        ride_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            UPDATE rides
            SET status = 'arrived', arrived_at = $3, updated_at = $3
            WHERE id = $1 AND status = 'accepted' AND driver_id = $2
            RETURNING *
            "#,
        )
        .bind(ride_id)
        .bind(driver_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ride)
    }

    pub async fn try_start(
        &self,
        ride_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            UPDATE rides
            SET status = 'in_progress', started_at = $3, updated_at = $3
            WHERE id = $1 AND status = 'arrived' AND driver_id = $2
            RETURNING *
            "#,
        )
        .bind(ride_id)
        .bind(driver_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ride)
    }

    pub async fn try_complete(
        &self,
        ride_id: Uuid,
        driver_id: Uuid,
        actual_duration_min: i32,
        fare: Decimal,
        fare_breakdown: serde_json::Value,
    ) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            UPDATE rides
            SET status = 'completed', completed_at = $3, updated_at = $3,
                actual_duration_min = $4, fare = $5, fare_breakdown = $6
            WHERE id = $1 AND status = 'in_progress' AND driver_id = $2
            RETURNING *
            "#,
        )
        .bind(ride_id)
        .bind(driver_id)
        .bind(Utc::now())
        .bind(actual_duration_min)
        .bind(fare)
        .bind(fare_breakdown)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ride)
    }

    pub async fn try_cancel(
        &self,
        ride_id: Uuid,
        cancelled_by: &str,
    ) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            UPDATE rides
            SET status = 'cancelled', cancelled_at = $3, cancelled_by = $2, updated_at = $3
            WHERE id = $1 AND status IN ('pending', 'accepted', 'arrived')
            RETURNING *
            "#,
        )
        .bind(ride_id)
        .bind(cancelled_by)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ride)
    }

    /// Viajes terminados del usuario (como pasajero o como conductor)
    pub async fn history_for_user(&self, user_id: Uuid) -> Result<Vec<Ride>, AppError> {
        let rides = sqlx::query_as::<_, Ride>(
            r#"
            SELECT * FROM rides
            WHERE (passenger_id = $1 OR driver_id = $1)
              AND status IN ('completed', 'cancelled')
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    /// Viajes en curso del usuario (como pasajero o como conductor)
    pub async fn active_for_user(&self, user_id: Uuid) -> Result<Vec<Ride>, AppError> {
        let rides = sqlx::query_as::<_, Ride>(
            r#"
            SELECT * FROM rides
            WHERE (passenger_id = $1 OR driver_id = $1)
              AND status IN ('pending', 'accepted', 'arrived', 'in_progress')
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    /// Viajes pendientes sin conductor, los más antiguos primero
    pub async fn available(&self) -> Result<Vec<Ride>, AppError> {
        let rides = sqlx::query_as::<_, Ride>(
            r#"
            SELECT * FROM rides
            WHERE status = 'pending' AND driver_id IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    pub async fn has_active_ride_as_passenger(&self, passenger_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rides
                WHERE passenger_id = $1
                  AND status IN ('pending', 'accepted', 'arrived', 'in_progress')
            )
            "#,
        )
        .bind(passenger_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    /// Releer solo el estado actual de un viaje, sin traer la fila entera
    pub async fn current_status(&self, ride_id: Uuid) -> Result<Option<RideStatus>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT status FROM rides WHERE id = $1")
            .bind(ride_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((status,)) => {
                let parsed = RideStatus::from_str(&status).ok_or_else(|| {
                    AppError::Internal(format!("Estado de viaje desconocido: {}", status))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }
}
