//! Domain models for the StockCare inventory platform

mod customer;
mod movement;
mod product;

pub use customer::*;
pub use movement::*;
pub use product::*;
