//! Route definitions for the StockCare API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/products", product_routes())
        .nest("/movements", movement_routes())
        .route(
            "/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/reports", report_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:id/movements", get(handlers::list_product_movements))
}

/// Movement ledger routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::post_movement),
        )
        .route("/:id", get(handlers::get_movement))
}

/// Report routes; each accepts `?format=csv`
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(handlers::get_low_stock_report))
        .route("/top-sold", get(handlers::get_top_sold_report))
        .route("/profitability", get(handlers::get_profitability_report))
}
