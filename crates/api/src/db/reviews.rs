//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use galeria_core::{ProductId, Rating, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    producto_id: i32,
    usuario_id: i32,
    usuario: String,
    contenido: String,
    calificacion: i32,
    fecha: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(r: ReviewRow) -> Result<Self, Self::Error> {
        let calificacion = Rating::new(r.calificacion).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;

        Ok(Self {
            id: ReviewId::new(r.id),
            producto_id: ProductId::new(r.producto_id),
            usuario_id: UserId::new(r.usuario_id),
            usuario: r.usuario,
            contenido: r.contenido,
            calificacion,
            fecha: r.fecha,
        })
    }
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// product (unique constraint on `(producto_id, usuario_id)`).
    pub async fn create(
        &self,
        producto_id: ProductId,
        usuario_id: UserId,
        contenido: &str,
        calificacion: Rating,
    ) -> Result<Review, RepositoryError> {
        let row: ReviewRow = sqlx::query_as(
            "WITH inserted AS (
                 INSERT INTO resena (producto_id, usuario_id, contenido, calificacion)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, producto_id, usuario_id, contenido, calificacion, fecha
             )
             SELECT i.id, i.producto_id, i.usuario_id, u.nombre AS usuario,
                    i.contenido, i.calificacion, i.fecha
             FROM inserted i
             JOIN usuario u ON u.id = i.usuario_id",
        )
        .bind(producto_id)
        .bind(usuario_id)
        .bind(contenido)
        .bind(calificacion)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "user already reviewed this product"))?;

        row.try_into()
    }

    /// List all reviews for a product, newest first.
    pub async fn list_for_product(
        &self,
        producto_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT r.id, r.producto_id, r.usuario_id, u.nombre AS usuario,
                    r.contenido, r.calificacion, r.fecha
             FROM resena r
             JOIN usuario u ON u.id = r.usuario_id
             WHERE r.producto_id = $1
             ORDER BY r.fecha DESC",
        )
        .bind(producto_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }
}
