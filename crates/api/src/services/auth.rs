//! Authentication: password hashing and JWT access tokens.
//!
//! Passwords are hashed with argon2id. Access tokens are HS256 JWTs that
//! carry the user ID, display name, and role so handlers can authorize
//! without a database round trip.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use galeria_core::{Role, UserId};

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password did not match an account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The bearer token is missing, malformed, or expired.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Token creation failed.
    #[error("token creation failed: {0}")]
    TokenCreation(String),
}

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: String,
    /// Display name.
    pub nombre: String,
    /// The user's role.
    pub rol: Role,
    /// Expiration time (unix seconds).
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// JWT ID.
    pub jti: String,
}

impl Claims {
    /// The user ID from the subject claim.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| AuthError::InvalidToken("invalid subject".to_owned()))
    }
}

/// Password hashing and token issuance/validation.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    /// Default access-token lifetime.
    const DEFAULT_TTL_HOURS: i64 = 12;

    /// Create an auth service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            token_ttl: Duration::hours(Self::DEFAULT_TTL_HOURS),
        }
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on mismatch; a malformed
    /// stored hash is also reported as invalid credentials rather than
    /// leaking state to the caller.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Issue an access token for a user.
    pub fn issue_token(
        &self,
        user_id: UserId,
        nombre: &str,
        rol: Role,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            nombre: nombre.to_owned(),
            rol,
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a bearer token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(&SecretString::from(
            "kX9mQ2vL7pR4wN8jT3bY6hF1dS5gA0zC".to_owned(),
        ))
    }

    #[test]
    fn password_hash_verifies() {
        let svc = service();
        let hash = svc.hash_password("hunter2hunter2").unwrap();
        assert!(svc.verify_password("hunter2hunter2", &hash).is_ok());
        assert!(matches!(
            svc.verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn malformed_stored_hash_is_invalid_credentials() {
        let svc = service();
        assert!(matches!(
            svc.verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn token_round_trips() {
        let svc = service();
        let token = svc
            .issue_token(UserId::new(7), "Ana", Role::Cliente)
            .unwrap();

        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(7));
        assert_eq!(claims.nombre, "Ana");
        assert_eq!(claims.rol, Role::Cliente);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let svc = service();
        let other = AuthService::new(&SecretString::from(
            "zZ1aB2cD3eF4gH5iJ6kL7mN8oP9qR0sT".to_owned(),
        ));
        let token = other
            .issue_token(UserId::new(1), "Eve", Role::Administrador)
            .unwrap();

        assert!(matches!(
            svc.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(service().validate_token("not.a.jwt").is_err());
    }
}
