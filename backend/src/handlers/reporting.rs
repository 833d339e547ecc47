//! Reporting handlers for the dashboard and data export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Dashboard, LowStockItem};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
pub struct TopSoldQuery {
    pub limit: Option<usize>,
    pub format: Option<String>,
}

/// Get the dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    let service = ReportingService::new(state.store.clone());
    let dashboard = service
        .dashboard(state.config.reporting.top_sold_limit)
        .await?;
    Ok(Json(dashboard))
}

/// Get the low-stock report
pub async fn get_low_stock_report(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let products = service.low_stock().await?;

    if wants_csv(query.format.as_deref()) {
        let rows: Vec<LowStockItem> = products.iter().map(LowStockItem::from).collect();
        return csv_download("low_stock.csv", &rows);
    }
    Ok(Json(products).into_response())
}

/// Get the top-sellers report
pub async fn get_top_sold_report(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TopSoldQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let limit = query
        .limit
        .unwrap_or(state.config.reporting.top_sold_limit);
    let data = service.top_sold(limit).await?;

    if wants_csv(query.format.as_deref()) {
        return csv_download("top_sold.csv", &data);
    }
    Ok(Json(data).into_response())
}

/// Get the profitability report
pub async fn get_profitability_report(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let data = service.profitability().await?;

    if wants_csv(query.format.as_deref()) {
        return csv_download("profitability.csv", &data);
    }
    Ok(Json(data).into_response())
}

fn wants_csv(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("csv"))
}

fn csv_download<T: Serialize>(filename: &str, data: &[T]) -> AppResult<Response> {
    let csv = ReportingService::export_to_csv(data)?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
