//! Order management for staff.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use galeria_core::{OrderId, OrderStatus, Role};

use crate::db::OrderRepository;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub estado: OrderStatus,
}

/// List all orders, newest first.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    user.require(Role::can_manage_orders)?;

    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Order detail.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Order>, ApiError> {
    user.require(Role::can_manage_orders)?;

    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await
        .map_err(|e| ApiError::from_repo(e, "pedido"))?;

    Ok(Json(order))
}

/// Update the fulfillment status of an order.
#[instrument(skip(state, user, request))]
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    user.require(Role::can_manage_orders)?;

    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), request.estado)
        .await
        .map_err(|e| ApiError::from_repo(e, "pedido"))?;

    tracing::info!(pedido_id = id, estado = %request.estado, "order status updated");

    Ok(Json(order))
}
