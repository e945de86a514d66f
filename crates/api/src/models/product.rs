//! Catalog product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use galeria_core::ProductId;

/// A catalog product.
///
/// `stock` is the count of unsold units; it is mutated only by the cart
/// aggregate (atomically, inside its transaction) and by staff catalog
/// updates.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub nombre: String,
    pub categoria: String,
    pub stock: i32,
    pub precio: Decimal,
    pub imagen: String,
    pub created_at: DateTime<Utc>,
}
