//! HTTP handlers for the StockCare API

pub mod customers;
pub mod health;
pub mod movements;
pub mod products;
pub mod reporting;

pub use customers::{create_customer, list_customers};
pub use health::health_check;
pub use movements::{get_movement, list_movements, post_movement};
pub use products::{
    create_product, delete_product, get_product, list_product_movements, list_products,
    update_product,
};
pub use reporting::{
    get_dashboard, get_low_stock_report, get_profitability_report, get_top_sold_report,
};
