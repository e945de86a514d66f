//! Product reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use galeria_core::{ProductId, Rating, ReviewId, UserId};

/// A product review.
///
/// At most one review exists per (product, user) pair; the database enforces
/// this with a unique constraint. Reviews are create/read only.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub producto_id: ProductId,
    pub usuario_id: UserId,
    /// Display name of the reviewer, denormalized for listings.
    pub usuario: String,
    pub contenido: String,
    pub calificacion: Rating,
    pub fecha: DateTime<Utc>,
}
