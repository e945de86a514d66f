//! Bearer token extractor.
//!
//! Route handlers that need the caller's identity take a [`CurrentUser`]
//! argument. The extractor reads the `Authorization: Bearer ...` header,
//! validates the JWT against the application's signing key, and exposes
//! the identity claims. Handlers enforce role policy themselves via the
//! methods on [`Role`].

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use galeria_core::{Role, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, decoded from the bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: CurrentUser) -> impl IntoResponse {
///     format!("Hola, {}!", user.nombre)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub nombre: String,
    pub rol: Role,
}

impl CurrentUser {
    /// Rejects the request unless the policy check passes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` when the caller's role fails `check`.
    pub fn require(&self, check: impl Fn(&Role) -> bool) -> Result<(), ApiError> {
        if check(&self.rol) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("se requiere un token de autenticación".to_owned())
            })?;

        let claims = state.auth().validate_token(token)?;
        let id = claims.user_id()?;

        Ok(Self {
            id,
            nombre: claims.nombre,
            rol: claims.rol,
        })
    }
}
