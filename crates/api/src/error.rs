//! Unified API error type and HTTP response mapping.
//!
//! Every handler returns `Result<_, ApiError>` and errors render as a JSON
//! envelope `{"detail": "..."}` with the appropriate status code, matching
//! what the storefront client expects.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CartError;
use crate::services::{AuthError, PayPalError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload failed domain validation.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation.
    #[error("no tiene permisos para realizar esta acción")]
    Forbidden,

    /// The requested resource does not exist.
    #[error("{0} no encontrado")]
    NotFound(&'static str),

    /// State conflict, e.g. duplicate email or duplicate review.
    #[error("{0}")]
    Conflict(String),

    /// Cart mutation rejected by the aggregate.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Payment provider call failed.
    #[error(transparent)]
    PayPal(#[from] PayPalError),

    /// Anything that should surface as a bare 500.
    #[error("error interno del servidor")]
    Internal,
}

impl ApiError {
    /// Convert a repository error, naming the resource for the 404 message.
    pub fn from_repo(err: RepositoryError, resource: &'static str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(resource),
            other => other.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Cart(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayPal(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("recurso"),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "database error");
                Self::Internal
            }
            RepositoryError::DataCorruption(msg) => {
                tracing::error!(detail = %msg, "data corruption");
                Self::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("credenciales inválidas".to_owned())
            }
            AuthError::InvalidToken(_) => Self::Unauthorized("token inválido".to_owned()),
            AuthError::Hash(msg) | AuthError::TokenCreation(msg) => {
                tracing::error!(detail = %msg, "auth service failure");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Provider errors pass the upstream body through so operators can
        // see what PayPal rejected; everything else renders the message.
        let detail = match &self {
            Self::PayPal(PayPalError::Api { status: code, body }) => {
                tracing::error!(provider_status = code, body = %body, "payment provider error");
                body.clone()
            }
            Self::PayPal(other) => {
                tracing::error!(error = %other, "payment provider call failed");
                json!("error al comunicarse con el proveedor de pagos")
            }
            other => json!(other.to_string()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_maps_to_404() {
        let err = ApiError::from(RepositoryError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = ApiError::from(RepositoryError::Conflict("email already exists".to_owned()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn cart_errors_map_to_400() {
        let err = ApiError::from(CartError::InsufficientStock {
            available: 2,
            requested: 5,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_credentials_map_to_401() {
        let err = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
