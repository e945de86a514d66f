//! Account administration.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use galeria_core::{Role, UserId};

use crate::db::{UserPatch, UserRepository};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<Role>,
    pub metodo_de_pago: Option<String>,
}

/// List all accounts.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<User>>, ApiError> {
    user.require(Role::can_administer_users)?;

    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// Update an account, including role assignment.
#[instrument(skip(state, user, request))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    user.require(Role::can_administer_users)?;

    let patch = UserPatch {
        nombre: request.nombre,
        telefono: request.telefono,
        rol: request.rol,
        metodo_de_pago: request.metodo_de_pago,
    };

    let updated = UserRepository::new(state.pool())
        .update(UserId::new(id), &patch)
        .await
        .map_err(|e| ApiError::from_repo(e, "usuario"))?;

    tracing::info!(user_id = %updated.id, "account updated");

    Ok(Json(updated))
}

/// Delete an account.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    user.require(Role::can_administer_users)?;

    UserRepository::new(state.pool())
        .delete(UserId::new(id))
        .await
        .map_err(|e| ApiError::from_repo(e, "usuario"))?;

    tracing::info!(user_id = id, "account deleted");

    Ok(StatusCode::NO_CONTENT)
}
