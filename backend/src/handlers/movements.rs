//! HTTP handlers for the stock movement ledger

use axum::{extract::State, http::StatusCode, Json};
use shared::{NewMovement, StockMovement};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::services::LedgerService;
use crate::AppState;

/// List all movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = LedgerService::new(state.store.clone());
    let movements = service.list().await?;
    Ok(Json(movements))
}

/// Post a purchase or sale
pub async fn post_movement(
    State(state): State<AppState>,
    AppJson(input): AppJson<NewMovement>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let service = LedgerService::new(state.store.clone());
    let movement = service.post_movement(input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Get a movement by ID
pub async fn get_movement(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<StockMovement>> {
    let service = LedgerService::new(state.store.clone());
    let movement = service.get(id).await?;
    Ok(Json(movement))
}
