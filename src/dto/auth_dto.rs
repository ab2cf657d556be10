use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserResponse;

// Request de registro de usuario (pasajero o conductor)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,

    #[validate(length(min = 10, max = 20))]
    pub phone: Option<String>,

    // "passenger" | "driver" - se valida en el controller
    pub role: String,
}

// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: Option<String>,
    pub message: Option<String>,
    pub user: Option<UserResponse>,
}

impl LoginResponse {
    pub fn success(token: String, user: UserResponse) -> Self {
        Self {
            success: true,
            token: Some(token),
            message: None,
            user: Some(user),
        }
    }

    pub fn success_with_message(token: String, user: UserResponse, message: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            message: Some(message),
            user: Some(user),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            token: None,
            message: Some(message),
            user: None,
        }
    }
}
