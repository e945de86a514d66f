//! Catalog and review handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use galeria_core::{ProductId, Rating, Role};

use crate::db::{ProductPatch, ProductRepository, ReviewRepository};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Product, Review};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub nombre: String,
    pub categoria: String,
    pub stock: i32,
    pub precio: Decimal,
    pub imagen: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub nombre: Option<String>,
    pub categoria: Option<String>,
    pub stock: Option<i32>,
    pub precio: Option<Decimal>,
    pub imagen: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub contenido: String,
    pub calificacion: Rating,
}

/// Product detail payload: the product plus its reviews, newest first.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub producto: Product,
    pub resenas: Vec<Review>,
}

/// List all products.
#[instrument(skip(state, _user))]
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Product detail with its reviews.
#[instrument(skip(state, _user))]
pub async fn show(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ProductDetail>, ApiError> {
    let id = ProductId::new(id);

    let producto = ProductRepository::new(state.pool())
        .get(id)
        .await
        .map_err(|e| ApiError::from_repo(e, "producto"))?;
    let resenas = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;

    Ok(Json(ProductDetail { producto, resenas }))
}

/// Create a product.
#[instrument(skip(state, user, request))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    user.require(Role::can_administer_catalog)?;
    validate_catalog_fields(Some(request.stock), Some(request.precio))?;

    let product = ProductRepository::new(state.pool())
        .create(
            &request.nombre,
            &request.categoria,
            request.stock,
            request.precio,
            &request.imagen,
        )
        .await?;

    tracing::info!(producto_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product.
#[instrument(skip(state, user, request))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    user.require(Role::can_update_catalog)?;
    validate_catalog_fields(request.stock, request.precio)?;

    let patch = ProductPatch {
        nombre: request.nombre,
        categoria: request.categoria,
        stock: request.stock,
        precio: request.precio,
        imagen: request.imagen,
    };

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &patch)
        .await
        .map_err(|e| ApiError::from_repo(e, "producto"))?;

    tracing::info!(producto_id = %product.id, "product updated");

    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    user.require(Role::can_administer_catalog)?;

    ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await
        .map_err(|e| ApiError::from_repo(e, "producto"))?;

    tracing::info!(producto_id = id, "product deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Add a review to a product. One review per (user, product).
#[instrument(skip(state, user, request))]
pub async fn add_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<AddReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    if request.contenido.trim().is_empty() {
        return Err(ApiError::Validation(
            "el contenido de la reseña es obligatorio".to_owned(),
        ));
    }

    let producto_id = ProductId::new(id);

    // Surface a 404 for a missing product rather than a foreign key error.
    ProductRepository::new(state.pool())
        .get(producto_id)
        .await
        .map_err(|e| ApiError::from_repo(e, "producto"))?;

    let review = ReviewRepository::new(state.pool())
        .create(
            producto_id,
            user.id,
            request.contenido.trim(),
            request.calificacion,
        )
        .await?;

    tracing::info!(producto_id = id, usuario_id = %user.id, "review added");

    Ok((StatusCode::CREATED, Json(review)))
}

fn validate_catalog_fields(stock: Option<i32>, precio: Option<Decimal>) -> Result<(), ApiError> {
    if stock.is_some_and(|s| s < 0) {
        return Err(ApiError::Validation(
            "el stock no puede ser negativo".to_owned(),
        ));
    }
    if precio.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ApiError::Validation(
            "el precio no puede ser negativo".to_owned(),
        ));
    }
    Ok(())
}
