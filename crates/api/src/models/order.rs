//! Orders (pedidos).

use chrono::{DateTime, Utc};
use serde::Serialize;

use galeria_core::{CartId, OrderId, OrderStatus};

/// A finalized reference to a paid cart plus a fulfillment status.
///
/// Created by checkout finalization; the status labels are then mutated by
/// staff through the orders endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub carro_id: CartId,
    pub estado: OrderStatus,
    pub direccion: String,
    pub fecha_compra: DateTime<Utc>,
}
