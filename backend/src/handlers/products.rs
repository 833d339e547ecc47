//! HTTP handlers for product catalog endpoints

use axum::{extract::State, http::StatusCode, Json};
use shared::{Product, ProductDetails, ProductDraft, StockMovement};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::services::{CatalogService, LedgerService, UpdateProductInput};
use crate::AppState;

/// List all products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.store.clone());
    let products = service.list().await?;
    Ok(Json(products))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(input): AppJson<ProductDraft>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = CatalogService::new(state.store.clone());
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product together with its movement history
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ProductDetails>> {
    let service = CatalogService::new(state.store.clone());
    let details = service.get_with_movements(id).await?;
    Ok(Json(details))
}

/// Update a product; the body must carry the version last read
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.store.clone());
    let product = service.update(id, input).await?;
    Ok(Json(product))
}

/// Delete a product and its movements
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    let service = CatalogService::new(state.store.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the movements of one product
pub async fn list_product_movements(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = LedgerService::new(state.store.clone());
    let movements = service.list_for_product(id).await?;
    Ok(Json(movements))
}
