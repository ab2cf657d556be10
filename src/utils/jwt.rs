//! Utilidades para generación y verificación de tokens JWT

use crate::config::EnvironmentConfig;
use crate::models::UserRole;
use crate::utils::errors::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims del token JWT para usuarios autenticados
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// ID del usuario (UUID como string)
    pub sub: String,
    /// Rol del usuario (passenger | driver)
    pub role: String,
    /// Timestamp de expiración
    pub exp: usize,
    /// Timestamp de emisión
    pub iat: usize,
}

/// Configuración JWT
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    pub fn from_env_config(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiration_hours,
        }
    }
}

/// Genera un token JWT para un usuario
pub fn generate_token(
    user_id: Uuid,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expiration = now + chrono::Duration::hours(config.expiration_hours);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Jwt(format!("Error generando token: {}", e)))
}

/// Verifica y decodifica un token JWT
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expirado".to_string())
        }
        _ => AppError::Unauthorized("Token inválido".to_string()),
    })
}

/// Extrae el token del header Authorization (formato "Bearer <token>")
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Formato de autorización inválido".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-for-unit-tests".to_string(),
            expiration_hours: 24,
        }
    }

    #[test]
    fn test_generate_and_verify_token() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = generate_token(user_id, UserRole::Passenger, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "passenger");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_driver_role_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = generate_token(user_id, UserRole::Driver, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.role, "driver");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let config = test_config();
        let other = JwtConfig {
            secret: "otro-secreto-distinto".to_string(),
            expiration_hours: 24,
        };
        let token = generate_token(Uuid::new_v4(), UserRole::Passenger, &config).unwrap();

        let result = verify_token(&token, &other);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // Expiración negativa: el token nace vencido (más allá del leeway por defecto)
        let config = JwtConfig {
            secret: "test-secret-for-unit-tests".to_string(),
            expiration_hours: -2,
        };
        let token = generate_token(Uuid::new_v4(), UserRole::Driver, &config).unwrap();

        let result = verify_token(&token, &config);
        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token expirado"),
            other => panic!("Se esperaba token expirado, se obtuvo: {:?}", other),
        }
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc123").unwrap(), "abc123");
        assert!(extract_token_from_header("abc123").is_err());
        assert!(extract_token_from_header("Basic abc123").is_err());
    }
}
