//! WebAssembly module for the StockCare inventory platform
//!
//! Provides client-side checks for the product and movement forms, using the
//! same rules the backend enforces:
//! - Product form validation
//! - Sale pre-checks against displayed stock
//! - Profit per unit display

use rust_decimal::Decimal;
use shared::{
    apply_movement, validate_movement, validate_product, FieldError, MovementKind, NewMovement,
    ProductDraft,
};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

/// Validate a product form given as JSON.
///
/// Returns a JSON array of field errors; an empty array means the form is valid.
#[wasm_bindgen]
pub fn validate_product_form(form_json: &str) -> String {
    let errors = match serde_json::from_str::<ProductDraft>(form_json) {
        Ok(draft) => validate_product(&draft),
        Err(e) => vec![parse_error(e)],
    };
    to_json(&errors)
}

/// Validate a movement form given as JSON; same output as `validate_product_form`
#[wasm_bindgen]
pub fn validate_movement_form(form_json: &str) -> String {
    let errors = match serde_json::from_str::<NewMovement>(form_json) {
        Ok(movement) => validate_movement(&movement),
        Err(e) => vec![parse_error(e)],
    };
    to_json(&errors)
}

/// Whether a sale of `quantity` can be covered by `current_stock`
#[wasm_bindgen]
pub fn can_sell(current_stock: i32, quantity: i32) -> bool {
    apply_movement(current_stock, MovementKind::Sale, quantity).is_ok()
}

/// Stock is strictly below the minimum
#[wasm_bindgen]
pub fn is_low_stock(current_stock: i32, minimum_stock: i32) -> bool {
    current_stock < minimum_stock
}

/// Sale price minus purchase price, as a decimal string.
///
/// Returns `None` when either price is not a valid decimal or the difference overflows.
#[wasm_bindgen]
pub fn profit_per_unit(sale_price: &str, purchase_price: &str) -> Option<String> {
    let sale = Decimal::from_str(sale_price.trim()).ok()?;
    let purchase = Decimal::from_str(purchase_price.trim()).ok()?;
    sale.checked_sub(purchase).map(|profit| profit.to_string())
}

fn parse_error(err: serde_json::Error) -> FieldError {
    FieldError::new("form", "parse", format!("Invalid form data: {}", err))
}

fn to_json(errors: &[FieldError]) -> String {
    serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string())
}
