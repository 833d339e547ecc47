//! Business logic services for the StockCare inventory platform

pub mod catalog;
pub mod customers;
pub mod ledger;
pub mod reporting;

pub use catalog::{CatalogService, UpdateProductInput};
pub use customers::CustomerService;
pub use ledger::LedgerService;
pub use reporting::ReportingService;
