use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::{UserResponse, UserRole};
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct AuthController {
    repository: UserRepository,
    jwt_config: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt_config: JwtConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt_config,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<LoginResponse, AppError> {
        // Validar campos declarativos (longitudes, formato de email)
        request.validate()?;

        // El rol viaja como string libre en el body
        let role = UserRole::from_str(&request.role).ok_or_else(|| {
            AppError::BadRequest("El rol debe ser 'passenger' o 'driver'".to_string())
        })?;

        // Verificar que el email no exista
        if self.repository.email_exists(&request.email).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        // Hash de la contraseña
        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))?;

        let user = self
            .repository
            .create(
                &request.full_name,
                &request.email,
                request.phone.as_deref(),
                &password_hash,
                role,
            )
            .await?;

        tracing::info!("👤 Usuario registrado: {} ({})", user.email, role.as_str());

        // El registro deja al usuario autenticado de entrada
        let token = generate_token(user.id, user.role, &self.jwt_config)?;

        Ok(LoginResponse::success_with_message(
            token,
            UserResponse::from(user),
            "Usuario registrado exitosamente".to_string(),
        ))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        // Buscar usuario por email. El mensaje no distingue entre email
        // desconocido y contraseña incorrecta.
        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Cuenta desactivada".to_string()));
        }

        // Verificar contraseña
        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        // Generar JWT token
        let token = generate_token(user.id, user.role, &self.jwt_config)?;

        Ok(LoginResponse::success(token, UserResponse::from(user)))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(UserResponse::from(user))
    }
}
