//! Catalog service: product lifecycle with optimistic concurrency

use serde::{Deserialize, Serialize};
use shared::{validate_product, Product, ProductChanges, ProductDetails, ProductDraft};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::DynStore;

/// Catalog service for creating, editing and removing products
#[derive(Clone)]
pub struct CatalogService {
    store: DynStore,
}

/// Input for updating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProductInput {
    /// Version the caller last read; the update is refused if it is stale
    pub version: i64,
    #[serde(flatten)]
    pub changes: ProductChanges,
}

impl CatalogService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Create a product
    pub async fn create(&self, draft: ProductDraft) -> AppResult<Product> {
        let errors = validate_product(&draft);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let product = self.store.insert_product(draft).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");

        Ok(product)
    }

    /// Get a product by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))
    }

    /// List all products ordered by name
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        self.store.list_products().await
    }

    /// Get a product with its movement history, newest first
    pub async fn get_with_movements(&self, id: Uuid) -> AppResult<ProductDetails> {
        let product = self.get(id).await?;
        let movements = self.store.list_product_movements(id).await?;
        Ok(ProductDetails { product, movements })
    }

    /// Apply a partial update, guarded by the caller's version.
    ///
    /// The merged record goes through the same validation as `create`.
    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let current = self.get(id).await?;

        if current.version != input.version {
            tracing::warn!(
                product_id = %id,
                expected = input.version,
                current = current.version,
                "Rejected stale product update"
            );
            return Err(AppError::Conflict {
                resource: format!("Product {}", id),
                expected_version: input.version,
                current_version: current.version,
            });
        }

        let draft = input.changes.merge_onto(&current);
        let errors = validate_product(&draft);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let updated = self
            .store
            .update_product(id, input.version, draft)
            .await
            .map_err(|e| {
                if let AppError::Conflict { .. } = e {
                    tracing::warn!(product_id = %id, "Product changed while the update was in flight");
                }
                e
            })?;

        tracing::info!(product_id = %id, version = updated.version, "Product updated");
        Ok(updated)
    }

    /// Delete a product and every movement recorded against it
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let movements = self.store.delete_product(id).await?;
        tracing::info!(product_id = %id, movements, "Product deleted");
        Ok(())
    }
}
