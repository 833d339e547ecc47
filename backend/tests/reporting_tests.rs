//! Reporting tests
//!
//! Low-stock, top-sellers, profitability and the dashboard, computed from
//! movements posted through the ledger.

use rust_decimal::Decimal;
use shared::{MovementKind, NewMovement, Product, ProductDraft};
use std::str::FromStr;
use std::sync::Arc;
use stockcare_backend::services::{CatalogService, LedgerService, ReportingService};
use stockcare_backend::store::{DynStore, MemoryStore};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Fixture {
    catalog: CatalogService,
    ledger: LedgerService,
    reporting: ReportingService,
}

impl Fixture {
    fn new() -> Self {
        let store: DynStore = Arc::new(MemoryStore::new());
        Self {
            catalog: CatalogService::new(store.clone()),
            ledger: LedgerService::new(store.clone()),
            reporting: ReportingService::new(store),
        }
    }

    async fn product(&self, name: &str, purchase: &str, sale: &str, stock: i32, minimum: i32) -> Product {
        self.catalog
            .create(ProductDraft {
                name: name.to_string(),
                description: None,
                category: None,
                purchase_price: dec(purchase),
                sale_price: dec(sale),
                current_stock: stock,
                minimum_stock: minimum,
            })
            .await
            .unwrap()
    }

    async fn post(&self, product: &Product, kind: MovementKind, quantity: i32) {
        self.ledger
            .post_movement(NewMovement {
                product_id: product.id,
                kind,
                quantity,
                occurred_at: None,
                notes: None,
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_low_stock_is_strictly_below_minimum() {
    let fx = Fixture::new();
    let below = fx.product("Filters", "1", "2", 2, 5).await;
    fx.product("Beans", "1", "2", 5, 5).await;
    fx.product("Cups", "1", "2", 9, 5).await;

    let low = fx.reporting.low_stock().await.unwrap();
    assert_eq!(low, vec![below]);
}

#[tokio::test]
async fn test_low_stock_follows_movements() {
    let fx = Fixture::new();
    let product = fx.product("Filters", "1", "2", 6, 5).await;
    assert!(fx.reporting.low_stock().await.unwrap().is_empty());

    fx.post(&product, MovementKind::Sale, 2).await;

    let low = fx.reporting.low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].current_stock, 4);
}

#[tokio::test]
async fn test_top_sold_orders_and_excludes_unsold() {
    let fx = Fixture::new();
    let a = fx.product("A", "1", "2", 100, 0).await;
    let b = fx.product("B", "1", "2", 100, 0).await;
    let c = fx.product("C", "1", "2", 100, 0).await;
    let purchased_only = fx.product("D", "1", "2", 0, 0).await;

    fx.post(&a, MovementKind::Sale, 4).await;
    fx.post(&b, MovementKind::Sale, 7).await;
    fx.post(&a, MovementKind::Sale, 4).await;
    fx.post(&c, MovementKind::Sale, 1).await;
    fx.post(&purchased_only, MovementKind::Purchase, 50).await;

    let top = fx.reporting.top_sold(10).await.unwrap();
    let summary: Vec<_> = top.iter().map(|t| (t.name.as_str(), t.quantity_sold)).collect();
    assert_eq!(summary, vec![("A", 8), ("B", 7), ("C", 1)]);

    let top2 = fx.reporting.top_sold(2).await.unwrap();
    assert_eq!(top2.len(), 2);
    assert_eq!(top2[0].product_id, a.id);
    assert!(fx.reporting.top_sold(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_top_sold_ties_broken_by_id() {
    let fx = Fixture::new();
    let x = fx.product("X", "1", "2", 10, 0).await;
    let y = fx.product("Y", "1", "2", 10, 0).await;
    fx.post(&x, MovementKind::Sale, 3).await;
    fx.post(&y, MovementKind::Sale, 3).await;

    let mut expected = vec![x.id, y.id];
    expected.sort();

    let ids: Vec<_> = fx
        .reporting
        .top_sold(5)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.product_id)
        .collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_profitability_example() {
    let fx = Fixture::new();
    let mug = fx.product("Mug", "30", "50", 10, 0).await;
    fx.post(&mug, MovementKind::Sale, 3).await;
    fx.post(&mug, MovementKind::Sale, 2).await;
    fx.post(&mug, MovementKind::Purchase, 4).await;

    let rows = fx.reporting.profitability().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity_sold, 5);
    assert_eq!(rows[0].profit_per_unit, dec("20"));
    assert_eq!(rows[0].total_profit, dec("100"));
}

#[tokio::test]
async fn test_profitability_reports_losses() {
    let fx = Fixture::new();
    let clearance = fx.product("Clearance", "12.50", "10.00", 4, 0).await;
    fx.product("Unsold", "1", "9", 4, 0).await;
    fx.post(&clearance, MovementKind::Sale, 4).await;

    let rows = fx.reporting.profitability().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].profit_per_unit, dec("-2.50"));
    assert_eq!(rows[0].total_profit, dec("-10.00"));
}

#[tokio::test]
async fn test_deleted_products_drop_out_of_reports() {
    let fx = Fixture::new();
    let gone = fx.product("Gone", "1", "3", 10, 20).await;
    let kept = fx.product("Kept", "1", "3", 10, 0).await;
    fx.post(&gone, MovementKind::Sale, 9).await;
    fx.post(&kept, MovementKind::Sale, 1).await;

    fx.catalog.delete(gone.id).await.unwrap();

    let dashboard = fx.reporting.dashboard(10).await.unwrap();
    assert_eq!(dashboard.total_products, 1);
    assert_eq!(dashboard.low_stock_count, 0);
    assert_eq!(dashboard.top_sold.len(), 1);
    assert_eq!(dashboard.top_sold[0].product_id, kept.id);
    assert_eq!(dashboard.profitability.len(), 1);
}

#[tokio::test]
async fn test_dashboard_combines_views() {
    let fx = Fixture::new();
    let low = fx.product("Low", "2", "5", 1, 3).await;
    let seller = fx.product("Seller", "10", "15", 20, 2).await;
    fx.post(&seller, MovementKind::Sale, 6).await;

    let dashboard = fx.reporting.dashboard(1).await.unwrap();
    assert_eq!(dashboard.total_products, 2);
    assert_eq!(dashboard.low_stock_count, 1);
    assert_eq!(dashboard.low_stock[0].id, low.id);
    assert_eq!(dashboard.top_sold.len(), 1);
    assert_eq!(dashboard.top_sold[0].quantity_sold, 6);
    assert_eq!(dashboard.profitability[0].total_profit, dec("30"));
}

#[tokio::test]
async fn test_unrepresentable_price_never_reaches_reports() {
    let fx = Fixture::new();

    let mut extreme = ProductDraft {
        name: "Extreme".to_string(),
        description: None,
        category: None,
        purchase_price: Decimal::ZERO,
        sale_price: Decimal::MAX,
        current_stock: 10,
        minimum_stock: 0,
    };
    match fx.catalog.create(extreme.clone()).await {
        Err(stockcare_backend::AppError::Validation(errors)) => {
            assert_eq!(errors[0].field, "sale_price");
            assert_eq!(errors[0].code, "max");
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    extreme.sale_price = dec("9999999999999999.99");
    let product = fx.catalog.create(extreme).await.unwrap();
    fx.post(&product, MovementKind::Sale, 2).await;

    let dashboard = fx.reporting.dashboard(10).await.unwrap();
    assert_eq!(dashboard.profitability[0].total_profit, dec("19999999999999999.98"));
}
