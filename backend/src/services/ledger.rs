//! Ledger service: posting purchases and sales against product stock

use shared::{apply_movement, validate_movement, NewMovement, StockMovement};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::DynStore;

/// Ledger service for recording stock movements
#[derive(Clone)]
pub struct LedgerService {
    store: DynStore,
}

impl LedgerService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Record a movement and adjust the product's stock in one atomic step.
    ///
    /// Checks run in order: product exists, fields are valid, the sale is
    /// covered by stock. The store repeats the stock check under its lock, so
    /// a concurrent posting can still turn an accepted proposal into
    /// `InsufficientStock`.
    pub async fn post_movement(&self, input: NewMovement) -> AppResult<StockMovement> {
        let product_id = input.product_id;

        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;

        let errors = validate_movement(&input);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if let Err(e) = apply_movement(product.current_stock, input.kind, input.quantity) {
            tracing::warn!(%product_id, kind = %input.kind, quantity = input.quantity, "Movement rejected: {}", e);
            return Err(AppError::from_stock(product_id, e));
        }

        let kind = input.kind;
        let quantity = input.quantity;
        let movement = self.store.post_movement(input).await.map_err(|e| {
            if let AppError::InsufficientStock { available, .. } = &e {
                tracing::warn!(%product_id, quantity, available = *available, "Sale lost the race for stock");
            }
            e
        })?;

        tracing::info!(
            movement_id = %movement.id,
            %product_id,
            %kind,
            quantity,
            "Movement posted"
        );

        Ok(movement)
    }

    /// Get a movement by ID
    pub async fn get(&self, id: Uuid) -> AppResult<StockMovement> {
        self.store
            .get_movement(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movement {}", id)))
    }

    /// List all movements, newest first
    pub async fn list(&self) -> AppResult<Vec<StockMovement>> {
        self.store.list_movements().await
    }

    /// List one product's movements, newest first
    pub async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        self.store.list_product_movements(product_id).await
    }
}
