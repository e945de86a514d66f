//! Database access for the Galería backend.
//!
//! All repositories use sqlx's runtime query API against PostgreSQL. Cart
//! mutations run inside a single transaction with the affected rows locked
//! `FOR UPDATE`, so stock, line quantity, and the derived total move
//! together or not at all.
//!
//! Migrations live in `crates/api/migrations/` and are embedded with
//! [`sqlx::migrate!`]; the server runs them on startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod carts;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod users;

pub use carts::{CartMutation, CartRepository};
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use products::{ProductPatch, ProductRepository};
pub use reviews::ReviewRepository;
pub use users::{UserPatch, UserRepository};

/// Embedded migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness rule was violated (duplicate email, duplicate review).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A row held data the domain types reject.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into `Conflict`.
    pub(crate) fn from_unique(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
