//! Read-side aggregations over the catalog and the movement ledger
//!
//! Everything here is pure: callers hand in a snapshot of products and
//! per-product sales totals, and get derived views back.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{MovementKind, Product, StockMovement};

/// A report figure that cannot be represented
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("profit of product {product_id} overflows: {profit_per_unit} x {quantity_sold}")]
    ProfitOverflow {
        product_id: Uuid,
        profit_per_unit: Decimal,
        quantity_sold: i64,
    },
}

/// Total quantity sold for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTotal {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Entry of the top-sellers report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSeller {
    pub product_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
}

/// Profitability of one product that has been sold at least once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProfit {
    pub product_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub profit_per_unit: Decimal,
    pub total_profit: Decimal,
}

/// Flat row of the low-stock report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub product_id: Uuid,
    pub name: String,
    pub current_stock: i32,
    pub minimum_stock: i32,
}

impl From<&Product> for LowStockItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            current_stock: product.current_stock,
            minimum_stock: product.minimum_stock,
        }
    }
}

/// Everything the dashboard shows, computed from a single snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub low_stock: Vec<Product>,
    pub top_sold: Vec<TopSeller>,
    pub profitability: Vec<ProductProfit>,
}

/// Products whose stock is strictly below their minimum.
///
/// The iterator is lazy and can be cloned to walk the products again.
pub fn low_stock(products: &[Product]) -> impl Iterator<Item = &Product> + Clone {
    products.iter().filter(|p| p.is_low_stock())
}

/// Low-stock products ordered by name, then id
pub fn low_stock_sorted(products: &[Product]) -> Vec<Product> {
    let mut items: Vec<Product> = low_stock(products).cloned().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    items
}

/// Sum sale quantities per product. Products without sales are absent.
pub fn sales_totals<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> Vec<SalesTotal> {
    let mut sums: HashMap<Uuid, i64> = HashMap::new();
    for movement in movements {
        if movement.kind == MovementKind::Sale {
            *sums.entry(movement.product_id).or_insert(0) += i64::from(movement.quantity);
        }
    }

    let mut totals: Vec<SalesTotal> = sums
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .map(|(product_id, quantity)| SalesTotal {
            product_id,
            quantity,
        })
        .collect();
    totals.sort_by_key(|t| t.product_id);
    totals
}

/// The `n` best-selling products, by summed sale quantity descending.
///
/// Ties are broken by product id. Totals for products missing from `products`
/// are skipped.
pub fn top_sold(products: &[Product], sales: &[SalesTotal], n: usize) -> Vec<TopSeller> {
    let by_id = index(products);

    let mut sellers: Vec<TopSeller> = sales
        .iter()
        .filter(|t| t.quantity > 0)
        .filter_map(|t| {
            by_id.get(&t.product_id).map(|p| TopSeller {
                product_id: p.id,
                name: p.name.clone(),
                quantity_sold: t.quantity,
            })
        })
        .collect();

    sellers.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    sellers.truncate(n);
    sellers
}

/// Per-product profit for every product sold at least once, ordered by name.
///
/// Fails instead of wrapping when a total does not fit a `Decimal`.
pub fn profitability(
    products: &[Product],
    sales: &[SalesTotal],
) -> Result<Vec<ProductProfit>, ReportError> {
    let by_id = index(products);

    let mut rows = Vec::new();
    for total in sales.iter().filter(|t| t.quantity > 0) {
        let Some(p) = by_id.get(&total.product_id) else {
            continue;
        };

        let profit_per_unit = p.profit_per_unit();
        let total_profit = profit_per_unit
            .checked_mul(Decimal::from(total.quantity))
            .ok_or(ReportError::ProfitOverflow {
                product_id: p.id,
                profit_per_unit,
                quantity_sold: total.quantity,
            })?;

        rows.push(ProductProfit {
            product_id: p.id,
            name: p.name.clone(),
            quantity_sold: total.quantity,
            profit_per_unit,
            total_profit,
        });
    }

    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.product_id.cmp(&b.product_id)));
    Ok(rows)
}

/// Assemble the dashboard from one snapshot
pub fn dashboard(
    products: &[Product],
    sales: &[SalesTotal],
    top_n: usize,
) -> Result<Dashboard, ReportError> {
    let low = low_stock_sorted(products);
    Ok(Dashboard {
        total_products: products.len(),
        low_stock_count: low.len(),
        low_stock: low,
        top_sold: top_sold(products, sales, top_n),
        profitability: profitability(products, sales)?,
    })
}

fn index(products: &[Product]) -> HashMap<Uuid, &Product> {
    products.iter().map(|p| (p.id, p)).collect()
}
