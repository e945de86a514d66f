//! Cart handlers.
//!
//! The cart is serialized the way the storefront expects it:
//!
//! ```json
//! {
//!   "cliente": "Ana",
//!   "productos": [{"producto": "Cuadro grande", "cantidad": 2}],
//!   "total": "180000.00"
//! }
//! ```

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use galeria_core::{ProductId, Role, format_amount};

use crate::db::{CartRepository, RepositoryError};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::Cart;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub producto_id: i32,
    pub cantidad: i32,
}

/// One cart line as the storefront displays it.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    /// Product display name.
    pub producto: String,
    pub cantidad: i32,
}

/// Cart payload for the storefront.
#[derive(Debug, Serialize)]
pub struct CartView {
    /// Customer display name.
    pub cliente: String,
    pub productos: Vec<CartLineView>,
    /// Base-currency total, two fraction digits.
    pub total: String,
}

impl CartView {
    fn render(cliente: &str, cart: &Cart) -> Self {
        Self {
            cliente: cliente.to_owned(),
            productos: cart
                .lines
                .iter()
                .map(|line| CartLineView {
                    producto: line.nombre.clone(),
                    cantidad: line.cantidad,
                })
                .collect(),
            total: format_amount(cart.total),
        }
    }

    fn empty(cliente: &str) -> Self {
        Self {
            cliente: cliente.to_owned(),
            productos: Vec::new(),
            total: format_amount(rust_decimal::Decimal::ZERO),
        }
    }
}

/// Current cart for the authenticated customer.
///
/// A customer without an active cart gets an empty one rather than a 404;
/// the cart row itself is created lazily on the first add.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CartView>, ApiError> {
    user.require(Role::can_shop)?;

    match CartRepository::new(state.pool()).get_active(user.id).await {
        Ok(cart) => Ok(Json(CartView::render(&user.nombre, &cart))),
        Err(RepositoryError::NotFound) => Ok(Json(CartView::empty(&user.nombre))),
        Err(e) => Err(e.into()),
    }
}

/// Add a product to the cart, merging with an existing line.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>, ApiError> {
    user.require(Role::can_shop)?;

    let cart = CartRepository::new(state.pool())
        .add_line(
            user.id,
            ProductId::new(request.producto_id),
            request.cantidad,
        )
        .await
        .map_err(|e| ApiError::from_repo(e, "producto"))??;

    tracing::info!(
        usuario_id = %user.id,
        producto_id = request.producto_id,
        cantidad = request.cantidad,
        "cart line added"
    );

    Ok(Json(CartView::render(&user.nombre, &cart)))
}

/// Remove a product line from the cart, restoring its reserved stock.
///
/// Removing a product that is not in the cart is a no-op.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(producto_id): Path<i32>,
) -> Result<Json<CartView>, ApiError> {
    user.require(Role::can_shop)?;

    let cart = CartRepository::new(state.pool())
        .remove_line(user.id, ProductId::new(producto_id))
        .await
        .map_err(|e| ApiError::from_repo(e, "producto"))?;

    tracing::info!(usuario_id = %user.id, producto_id, "cart line removed");

    Ok(Json(cart.map_or_else(
        || CartView::empty(&user.nombre),
        |c| CartView::render(&user.nombre, &c),
    )))
}
