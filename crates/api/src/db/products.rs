//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use galeria_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

/// A partial catalog update; `None` fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct ProductPatch {
    pub nombre: Option<String>,
    pub categoria: Option<String>,
    pub stock: Option<i32>,
    pub precio: Option<Decimal>,
    pub imagen: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    nombre: String,
    categoria: String,
    stock: i32,
    precio: Decimal,
    imagen: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: ProductId::new(r.id),
            nombre: r.nombre,
            categoria: r.categoria,
            stock: r.stock,
            precio: r.precio,
            imagen: r.imagen,
            created_at: r.created_at,
        }
    }
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog, newest first.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, nombre, categoria, stock, precio, imagen, created_at
             FROM producto
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get one product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, nombre, categoria, stock, precio, imagen, created_at
             FROM producto
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Insert a new product.
    pub async fn create(
        &self,
        nombre: &str,
        categoria: &str,
        stock: i32,
        precio: Decimal,
        imagen: &str,
    ) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            "INSERT INTO producto (nombre, categoria, stock, precio, imagen)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, nombre, categoria, stock, precio, imagen, created_at",
        )
        .bind(nombre)
        .bind(categoria)
        .bind(stock)
        .bind(precio)
        .bind(imagen)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "UPDATE producto SET
                 nombre    = COALESCE($2, nombre),
                 categoria = COALESCE($3, categoria),
                 stock     = COALESCE($4, stock),
                 precio    = COALESCE($5, precio),
                 imagen    = COALESCE($6, imagen)
             WHERE id = $1
             RETURNING id, nombre, categoria, stock, precio, imagen, created_at",
        )
        .bind(id)
        .bind(patch.nombre.as_deref())
        .bind(patch.categoria.as_deref())
        .bind(patch.stock)
        .bind(patch.precio)
        .bind(patch.imagen.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Cascades to its reviews and cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM producto WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
