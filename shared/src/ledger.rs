//! Stock posting rule shared by every store implementation
//!
//! A store resolves the product, locks it, and calls [`apply_movement`] with
//! the stock it currently holds. Only when this returns `Ok` may the new stock
//! and the ledger entry be written, together.

use thiserror::Error;

use crate::models::{MovementKind, StockMovement};

/// Rejection of a proposed movement against a product's stock
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("stock would overflow: current {current}, adding {quantity}")]
    Overflow { current: i32, quantity: i32 },
}

/// Compute the stock level after posting a movement
pub fn apply_movement(current_stock: i32, kind: MovementKind, quantity: i32) -> Result<i32, StockError> {
    if quantity < 1 {
        return Err(StockError::InvalidQuantity(quantity));
    }

    match kind {
        MovementKind::Purchase => current_stock
            .checked_add(quantity)
            .ok_or(StockError::Overflow {
                current: current_stock,
                quantity,
            }),
        MovementKind::Sale => {
            if quantity > current_stock {
                return Err(StockError::InsufficientStock {
                    requested: quantity,
                    available: current_stock,
                });
            }
            Ok(current_stock - quantity)
        }
    }
}

/// Net stock change recorded by a set of movements
pub fn net_change<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> i64 {
    movements.into_iter().map(StockMovement::stock_delta).sum()
}
