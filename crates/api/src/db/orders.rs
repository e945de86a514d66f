//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use galeria_core::{CartId, OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::Order;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    carro_id: i32,
    estado: String,
    direccion: String,
    fecha_compra: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let estado: OrderStatus = r.estado.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(r.id),
            carro_id: CartId::new(r.carro_id),
            estado,
            direccion: r.direccion,
            fecha_compra: r.fecha_compra,
        })
    }
}

const ORDER_COLUMNS: &str = "id, carro_id, estado, direccion, fecha_compra";

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders, newest first.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM pedido ORDER BY fecha_compra DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Get one order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM pedido WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Update an order's fulfillment status label.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists.
    pub async fn update_status(
        &self,
        id: OrderId,
        estado: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE pedido SET estado = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(estado)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}
