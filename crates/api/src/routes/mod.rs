//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (pings the database)
//!
//! # Auth
//! POST /register/                       - Create a customer account
//! POST /login/                          - Exchange credentials for a token
//!
//! # Users (administrador)
//! GET    /usuarios/                     - List accounts
//! PUT    /usuarios/{id}/                - Update an account
//! DELETE /usuarios/{id}/                - Delete an account
//!
//! # Catalog
//! GET    /productos/                    - List products
//! GET    /productos/{id}/               - Product detail with reviews
//! POST   /productos/crear/              - Create (administrador)
//! PUT    /productos/{id}/actualizar/    - Update (administrador, empleado)
//! DELETE /productos/{id}/eliminar/      - Delete (administrador)
//! POST   /productos/{id}/agregar_resena/ - Add a review
//!
//! # Cart (cliente)
//! GET    /carrito/                      - Current cart
//! POST   /carrito/agregar/              - Add or merge a line
//! DELETE /carrito/eliminar/{producto_id}/ - Remove a line
//!
//! # Checkout (cliente)
//! POST /pagos/crear/                    - Start a provider payment
//! GET  /pagos/aprobar/                  - Approval callback
//! GET  /pagos/cancelar/                 - Cancel callback
//!
//! # Orders (empleado, administrador)
//! GET /pedidos/                         - List orders
//! GET /pedidos/{id}/                    - Order detail
//! PUT /pedidos/{id}/estado/             - Update fulfillment status
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        // Auth
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        // Users
        .route("/usuarios/", get(users::list))
        .route("/usuarios/{id}/", put(users::update).delete(users::remove))
        // Catalog
        .route("/productos/", get(products::list))
        .route("/productos/{id}/", get(products::show))
        .route("/productos/crear/", post(products::create))
        .route("/productos/{id}/actualizar/", put(products::update))
        .route("/productos/{id}/eliminar/", delete(products::remove))
        .route(
            "/productos/{id}/agregar_resena/",
            post(products::add_review),
        )
        // Cart
        .route("/carrito/", get(cart::show))
        .route("/carrito/agregar/", post(cart::add))
        .route("/carrito/eliminar/{producto_id}/", delete(cart::remove))
        // Checkout
        .route("/pagos/crear/", post(payments::create))
        .route("/pagos/aprobar/", get(payments::approve))
        .route("/pagos/cancelar/", get(payments::cancel))
        // Orders
        .route("/pedidos/", get(orders::list))
        .route("/pedidos/{id}/", get(orders::show))
        .route("/pedidos/{id}/estado/", put(orders::update_status))
}

/// Liveness check.
async fn health() -> &'static str {
    "OK"
}

/// Readiness check: verifies the database is reachable.
async fn ready(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
