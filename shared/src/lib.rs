//! Shared types and domain rules for the StockCare inventory platform
//!
//! This crate contains the models, validation, stock posting rule and report
//! aggregations shared between the backend and the browser (via WASM).

pub mod ledger;
pub mod models;
pub mod reports;
pub mod validation;

pub use ledger::*;
pub use models::*;
pub use reports::*;
pub use validation::*;
