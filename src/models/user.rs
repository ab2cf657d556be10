//! Modelo de User
//!
//! Este módulo contiene el struct User que mapea a la tabla users,
//! junto con los enums de rol y disponibilidad del conductor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Error al convertir un string de la base de datos a un enum del dominio
#[derive(Debug, thiserror::Error)]
#[error("valor desconocido en la base de datos: {0}")]
pub struct UnknownVariant(pub String);

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Passenger,
    Driver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Passenger => "passenger",
            UserRole::Driver => "driver",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "passenger" => Some(UserRole::Passenger),
            "driver" => Some(UserRole::Driver),
            _ => None,
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserRole::from_str(&value).ok_or(UnknownVariant(value))
    }
}

/// Disponibilidad del conductor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Offline,
    Online,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Offline => "offline",
            DriverStatus::Online => "online",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "offline" => Some(DriverStatus::Offline),
            "online" => Some(DriverStatus::Online),
            _ => None,
        }
    }
}

impl TryFrom<String> for DriverStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DriverStatus::from_str(&value).ok_or(UnknownVariant(value))
    }
}

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    #[sqlx(try_from = "String")]
    pub driver_status: DriverStatus,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response de usuario para la API (sin el hash de contraseña)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub driver_status: DriverStatus,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            driver_status: user.driver_status,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_round_trip() {
        assert_eq!(UserRole::Passenger.as_str(), "passenger");
        assert_eq!(UserRole::from_str("driver"), Some(UserRole::Driver));
        assert_eq!(UserRole::from_str("admin"), None);
    }

    #[test]
    fn test_driver_status_try_from() {
        assert_eq!(
            DriverStatus::try_from("online".to_string()).unwrap(),
            DriverStatus::Online
        );
        assert!(DriverStatus::try_from("busy".to_string()).is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&UserRole::Driver).unwrap();
        assert_eq!(json, "\"driver\"");
    }
}
