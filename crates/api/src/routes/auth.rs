//! Registration and login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use galeria_core::{Email, Role};

use crate::db::UserRepository;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub telefono: String,
    pub fecha_nacimiento: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access: String,
    pub role: Role,
    pub nombre: String,
}

/// Create a customer account.
///
/// Accounts created through self-registration are always `cliente`; staff
/// roles are assigned by an administrator through the users endpoints.
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let email = Email::parse(&request.email).map_err(|e| ApiError::Validation(e.to_string()))?;

    if request.nombre.trim().is_empty() {
        return Err(ApiError::Validation("el nombre es obligatorio".to_owned()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "la contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"
        )));
    }

    let password_hash = state.auth().hash_password(&request.password)?;

    let user = UserRepository::new(state.pool())
        .create(
            request.nombre.trim(),
            &email,
            &password_hash,
            &request.telefono,
            Role::Cliente,
            request.fecha_nacimiento,
        )
        .await?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for an access token.
///
/// Unknown email and wrong password produce the same 401 so the endpoint
/// does not reveal which accounts exist.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = Email::parse(&request.email)
        .map_err(|_| ApiError::Unauthorized("credenciales inválidas".to_owned()))?;

    let Some((user, password_hash)) = UserRepository::new(state.pool())
        .get_with_password(&email)
        .await?
    else {
        return Err(ApiError::Unauthorized("credenciales inválidas".to_owned()));
    };

    state
        .auth()
        .verify_password(&request.password, &password_hash)?;

    let access = state.auth().issue_token(user.id, &user.nombre, user.rol)?;

    tracing::info!(user_id = %user.id, "login");

    Ok(Json(LoginResponse {
        access,
        role: user.rol,
        nombre: user.nombre,
    }))
}
