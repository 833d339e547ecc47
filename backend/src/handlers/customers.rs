//! HTTP handlers for the customer directory

use axum::{extract::State, http::StatusCode, Json};
use shared::{Customer, NewCustomer};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::services::CustomerService;
use crate::AppState;

/// List customers by name
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.store.clone());
    Ok(Json(service.list().await?))
}

/// Register a customer
pub async fn create_customer(
    State(state): State<AppState>,
    AppJson(input): AppJson<NewCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let service = CustomerService::new(state.store.clone());
    let customer = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}
