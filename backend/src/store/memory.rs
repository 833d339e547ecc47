//! Process-local inventory store
//!
//! Each product lives in its own mutex-guarded slot together with its
//! movements, so postings against one product serialize while postings
//! against different products proceed independently.

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    apply_movement, sales_totals, sort_newest_first, Customer, NewCustomer, NewMovement, Product,
    ProductDraft, StockMovement,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use uuid::Uuid;

use super::{InventoryStore, ReportSnapshot};
use crate::error::{AppError, AppResult};

#[derive(Debug)]
struct ProductSlot {
    product: Product,
    movements: Vec<StockMovement>,
    /// Set when the product is removed while another task still holds the slot
    deleted: bool,
}

type Slot = Arc<Mutex<ProductSlot>>;

/// In-memory store for tests and local development.
///
/// Data does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: RwLock<HashMap<Uuid, Slot>>,
    customers: RwLock<Vec<Customer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: Uuid) -> AppResult<Option<Slot>> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    fn all_slots(&self) -> AppResult<Vec<Slot>> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut entries: Vec<(Uuid, Slot)> = products
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();
        // Fixed lock order for callers that hold several slots at once
        entries.sort_by_key(|(id, _)| *id);
        Ok(entries.into_iter().map(|(_, slot)| slot).collect())
    }

    /// Lock a slot, treating a concurrently deleted product as absent
    fn lock_live(slot: &Slot) -> AppResult<Option<MutexGuard<'_, ProductSlot>>> {
        let guard = slot.lock().map_err(|_| poisoned())?;
        if guard.deleted {
            return Ok(None);
        }
        Ok(Some(guard))
    }
}

fn poisoned() -> AppError {
    AppError::StorageError("lock poisoned".to_string())
}

fn product_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Product {}", id))
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        let _products = self.products.read().map_err(|_| poisoned())?;
        Ok(())
    }

    async fn insert_product(&self, draft: ProductDraft) -> AppResult<Product> {
        let product = Product::from_draft(Uuid::new_v4(), draft, Utc::now());
        let slot = ProductSlot {
            product: product.clone(),
            movements: Vec::new(),
            deleted: false,
        };

        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.insert(product.id, Arc::new(Mutex::new(slot)));
        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let Some(slot) = self.slot(id)? else {
            return Ok(None);
        };
        let guard = Self::lock_live(&slot)?;
        Ok(guard.map(|s| s.product.clone()))
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let mut products = Vec::new();
        for slot in self.all_slots()? {
            if let Some(guard) = Self::lock_live(&slot)? {
                products.push(guard.product.clone());
            }
        }
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn update_product(
        &self,
        id: Uuid,
        expected_version: i64,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        let slot = self.slot(id)?.ok_or_else(|| product_not_found(id))?;
        let mut guard = Self::lock_live(&slot)?.ok_or_else(|| product_not_found(id))?;

        if guard.product.version != expected_version {
            return Err(AppError::Conflict {
                resource: format!("Product {}", id),
                expected_version,
                current_version: guard.product.version,
            });
        }

        guard.product.apply_draft(draft, Utc::now());
        Ok(guard.product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<u64> {
        let slot = {
            let mut products = self.products.write().map_err(|_| poisoned())?;
            products.remove(&id).ok_or_else(|| product_not_found(id))?
        };

        let mut guard = slot.lock().map_err(|_| poisoned())?;
        guard.deleted = true;
        let removed = guard.movements.len() as u64;
        guard.movements.clear();
        Ok(removed)
    }

    async fn post_movement(&self, movement: NewMovement) -> AppResult<StockMovement> {
        let product_id = movement.product_id;
        let slot = self
            .slot(product_id)?
            .ok_or_else(|| product_not_found(product_id))?;
        let mut guard = Self::lock_live(&slot)?.ok_or_else(|| product_not_found(product_id))?;

        let new_stock = apply_movement(guard.product.current_stock, movement.kind, movement.quantity)
            .map_err(|e| AppError::from_stock(product_id, e))?;

        let now = Utc::now();
        let entry = movement.into_movement(Uuid::new_v4(), now);

        guard.product.current_stock = new_stock;
        guard.product.version += 1;
        guard.product.updated_at = now;
        guard.movements.push(entry.clone());

        Ok(entry)
    }

    async fn get_movement(&self, id: Uuid) -> AppResult<Option<StockMovement>> {
        for slot in self.all_slots()? {
            if let Some(guard) = Self::lock_live(&slot)? {
                if let Some(found) = guard.movements.iter().find(|m| m.id == id) {
                    return Ok(Some(found.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn list_movements(&self) -> AppResult<Vec<StockMovement>> {
        let mut movements = Vec::new();
        for slot in self.all_slots()? {
            if let Some(guard) = Self::lock_live(&slot)? {
                movements.extend(guard.movements.iter().cloned());
            }
        }
        sort_newest_first(&mut movements);
        Ok(movements)
    }

    async fn list_product_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let slot = self
            .slot(product_id)?
            .ok_or_else(|| product_not_found(product_id))?;
        let guard = Self::lock_live(&slot)?.ok_or_else(|| product_not_found(product_id))?;

        let mut movements = guard.movements.clone();
        sort_newest_first(&mut movements);
        Ok(movements)
    }

    async fn report_snapshot(&self) -> AppResult<ReportSnapshot> {
        let slots = self.all_slots()?;

        // Hold every slot until the pass is done so the snapshot is consistent
        let mut guards = Vec::with_capacity(slots.len());
        for slot in &slots {
            if let Some(guard) = Self::lock_live(slot)? {
                guards.push(guard);
            }
        }

        let products: Vec<Product> = guards.iter().map(|g| g.product.clone()).collect();
        let sales = sales_totals(guards.iter().flat_map(|g| g.movements.iter()));

        Ok(ReportSnapshot { products, sales })
    }

    async fn insert_customer(&self, customer: NewCustomer) -> AppResult<Customer> {
        let customer = customer.into_customer(Uuid::new_v4(), Utc::now());
        let mut customers = self.customers.write().map_err(|_| poisoned())?;
        customers.push(customer.clone());
        Ok(customer)
    }

    async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        let mut customers = self.customers.read().map_err(|_| poisoned())?.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(customers)
    }
}
