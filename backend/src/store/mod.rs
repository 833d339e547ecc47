//! Persistence boundary for the catalog and the movement ledger
//!
//! Services talk to an [`InventoryStore`]; two implementations exist:
//! [`PgStore`] for PostgreSQL and [`MemoryStore`] for tests and local runs.

use async_trait::async_trait;
use shared::{Customer, NewCustomer, NewMovement, Product, ProductDraft, SalesTotal, StockMovement};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Products and sales totals read in a single pass
#[derive(Debug, Clone, Default)]
pub struct ReportSnapshot {
    pub products: Vec<Product>,
    pub sales: Vec<SalesTotal>,
}

/// Transactional storage for products and their movements.
///
/// Implementations must:
/// - make `post_movement` an atomic read-validate-write, serialized per product
/// - make `delete_product` remove the product and its movements as one step
/// - only apply `update_product` when the stored version equals the expected one
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;

    /// Persist a validated product draft under a new identity
    async fn insert_product(&self, draft: ProductDraft) -> AppResult<Product>;

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// All products ordered by name
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    /// Replace the editable fields of a product.
    ///
    /// Fails with `NotFound` when the product is gone and with `Conflict` when
    /// its version no longer equals `expected_version`.
    async fn update_product(
        &self,
        id: Uuid,
        expected_version: i64,
        draft: ProductDraft,
    ) -> AppResult<Product>;

    /// Delete a product together with its movements; returns how many movements went with it
    async fn delete_product(&self, id: Uuid) -> AppResult<u64>;

    /// Apply a movement to its product's stock and append it to the ledger, atomically.
    ///
    /// The stock rule is evaluated against the stock held under the product's lock.
    async fn post_movement(&self, movement: NewMovement) -> AppResult<StockMovement>;

    async fn get_movement(&self, id: Uuid) -> AppResult<Option<StockMovement>>;

    /// All movements, newest first
    async fn list_movements(&self) -> AppResult<Vec<StockMovement>>;

    /// Movements of one product, newest first
    async fn list_product_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>>;

    /// Products and per-product sales totals for the reporting views
    async fn report_snapshot(&self) -> AppResult<ReportSnapshot>;

    /// Register a validated customer under a new identity
    async fn insert_customer(&self, customer: NewCustomer) -> AppResult<Customer>;

    /// All customers ordered by name
    async fn list_customers(&self) -> AppResult<Vec<Customer>>;
}

/// Shared handle to whichever store the application was configured with
pub type DynStore = Arc<dyn InventoryStore>;
