//! Validation utilities for the StockCare inventory platform
//!
//! Field constraints are declared on the models with `validator` derives; the
//! functions here run them and flatten the result into a list of
//! [`FieldError`]s that any transport layer can report.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{NewCustomer, NewMovement, ProductDraft};

/// A single violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// Model Validations
// ============================================================================

/// Validate a product draft, as used by both create and update
pub fn validate_product(draft: &ProductDraft) -> Vec<FieldError> {
    collect(draft.validate())
}

/// Validate the caller-supplied fields of a proposed movement
pub fn validate_movement(input: &NewMovement) -> Vec<FieldError> {
    collect(input.validate())
}

/// Validate a customer registration
pub fn validate_customer(input: &NewCustomer) -> Vec<FieldError> {
    let mut errors = collect(input.validate());
    // An empty email means "no email", not a malformed one
    if is_blank(input.email.as_deref()) {
        errors.retain(|e| e.field != "email");
    }
    errors
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn collect(result: Result<(), ValidationErrors>) -> Vec<FieldError> {
    let Err(errors) = result else {
        return Vec::new();
    };

    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                FieldError::new(field, e.code.to_string(), message)
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    fields
}

// ============================================================================
// Custom Field Validators
// ============================================================================

/// Reject empty and whitespace-only text
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(with_message("required", "This field is required"));
    }
    Ok(())
}

/// Largest number of decimal places a price may carry
pub const PRICE_SCALE: u32 = 2;

/// Prices must stay strictly below this bound (16 integer digits)
pub fn price_limit() -> Decimal {
    Decimal::from(10_000_000_000_000_000i64)
}

/// Prices may be zero but never negative, and must fit a `NUMERIC(18, 2)` column
pub fn validate_non_negative_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(with_message("non_negative", "Price cannot be negative"));
    }
    if *value >= price_limit() {
        return Err(with_message(
            "max",
            "Price must be below 10000000000000000",
        ));
    }
    if value.normalize().scale() > PRICE_SCALE {
        return Err(with_message(
            "scale",
            "Price can have at most 2 decimal places",
        ));
    }
    Ok(())
}

fn with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
