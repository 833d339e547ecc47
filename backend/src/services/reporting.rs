//! Reporting service for the dashboard and report exports

use serde::Serialize;
use shared::{reports, Dashboard, Product, ProductProfit, ReportError, TopSeller};

use crate::error::{AppError, AppResult};
use crate::store::DynStore;

/// Reporting service; read-only over the store
#[derive(Clone)]
pub struct ReportingService {
    store: DynStore,
}

impl ReportingService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Products strictly below their minimum stock, ordered by name
    pub async fn low_stock(&self) -> AppResult<Vec<Product>> {
        let snapshot = self.store.report_snapshot().await?;
        Ok(reports::low_stock_sorted(&snapshot.products))
    }

    /// Up to `n` best sellers by quantity sold
    pub async fn top_sold(&self, n: usize) -> AppResult<Vec<TopSeller>> {
        let snapshot = self.store.report_snapshot().await?;
        Ok(reports::top_sold(&snapshot.products, &snapshot.sales, n))
    }

    /// Profit figures for every product sold at least once
    pub async fn profitability(&self) -> AppResult<Vec<ProductProfit>> {
        let snapshot = self.store.report_snapshot().await?;
        reports::profitability(&snapshot.products, &snapshot.sales).map_err(report_error)
    }

    /// Dashboard view built from a single snapshot
    pub async fn dashboard(&self, top_n: usize) -> AppResult<Dashboard> {
        let snapshot = self.store.report_snapshot().await?;
        let dashboard = reports::dashboard(&snapshot.products, &snapshot.sales, top_n)
            .map_err(report_error)?;

        tracing::debug!(
            total_products = dashboard.total_products,
            low_stock = dashboard.low_stock_count,
            "Dashboard computed"
        );

        Ok(dashboard)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

fn report_error(err: ReportError) -> AppError {
    AppError::Internal(format!("Report could not be computed: {}", err))
}
