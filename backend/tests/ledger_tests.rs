//! Movement ledger tests
//!
//! Tests for stock posting including:
//! - stock reconciles with the ledger after every commit
//! - oversell is rejected without side effects
//! - concurrent sales on one product are linearized

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{net_change, MovementKind, NewMovement, Product, ProductDraft};
use std::sync::Arc;
use stockcare_backend::services::{CatalogService, LedgerService};
use stockcare_backend::store::{DynStore, MemoryStore};
use stockcare_backend::AppError;
use uuid::Uuid;

fn draft(stock: i32) -> ProductDraft {
    ProductDraft {
        name: "Drip kettle".to_string(),
        description: None,
        category: None,
        purchase_price: Decimal::from(20),
        sale_price: Decimal::from(35),
        current_stock: stock,
        minimum_stock: 2,
    }
}

fn movement(product_id: Uuid, kind: MovementKind, quantity: i32) -> NewMovement {
    NewMovement {
        product_id,
        kind,
        quantity,
        occurred_at: None,
        notes: None,
    }
}

async fn setup(stock: i32) -> (DynStore, Product) {
    let store: DynStore = Arc::new(MemoryStore::new());
    let product = CatalogService::new(store.clone())
        .create(draft(stock))
        .await
        .unwrap();
    (store, product)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_purchase_then_sale_adjusts_stock() {
    let (store, product) = setup(10).await;
    let ledger = LedgerService::new(store.clone());
    let catalog = CatalogService::new(store);

    ledger
        .post_movement(movement(product.id, MovementKind::Purchase, 5))
        .await
        .unwrap();
    let sale = ledger
        .post_movement(movement(product.id, MovementKind::Sale, 8))
        .await
        .unwrap();

    assert_eq!(sale.kind, MovementKind::Sale);
    assert_eq!(sale.quantity, 8);
    assert_eq!(sale.occurred_at, sale.created_at);

    let stored = catalog.get(product.id).await.unwrap();
    assert_eq!(stored.current_stock, 7);
    assert_eq!(stored.version, 3);
}

#[tokio::test]
async fn test_sale_of_exact_stock_leaves_zero() {
    let (store, product) = setup(5).await;
    let ledger = LedgerService::new(store.clone());

    ledger
        .post_movement(movement(product.id, MovementKind::Sale, 5))
        .await
        .unwrap();

    let stored = CatalogService::new(store).get(product.id).await.unwrap();
    assert_eq!(stored.current_stock, 0);
}

#[tokio::test]
async fn test_oversell_rejected_without_side_effects() {
    let (store, product) = setup(5).await;
    let ledger = LedgerService::new(store.clone());

    let err = ledger
        .post_movement(movement(product.id, MovementKind::Sale, 6))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientStock {
            requested: 6,
            available: 5,
            ..
        }
    ));
    assert_eq!(
        CatalogService::new(store).get(product.id).await.unwrap(),
        product
    );
    assert!(ledger.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_positive_quantity_is_a_field_error() {
    let (store, product) = setup(5).await;
    let ledger = LedgerService::new(store);

    for quantity in [0, -4] {
        match ledger
            .post_movement(movement(product.id, MovementKind::Purchase, quantity))
            .await
        {
            Err(AppError::Validation(errors)) => assert_eq!(errors[0].field, "quantity"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
    assert!(ledger.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_product_is_checked_first() {
    let (store, _) = setup(5).await;
    let ledger = LedgerService::new(store);

    let err = ledger
        .post_movement(movement(Uuid::new_v4(), MovementKind::Sale, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_overlong_notes_rejected() {
    let (store, product) = setup(5).await;
    let ledger = LedgerService::new(store);

    let mut input = movement(product.id, MovementKind::Purchase, 1);
    input.notes = Some("x".repeat(501));

    assert!(matches!(
        ledger.post_movement(input).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_purchase_overflow_is_a_field_error() {
    let (store, product) = setup(i32::MAX - 1).await;
    let ledger = LedgerService::new(store);

    match ledger
        .post_movement(movement(product.id, MovementKind::Purchase, 2))
        .await
    {
        Err(AppError::Validation(errors)) => assert_eq!(errors[0].code, "overflow"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_orders_by_occurrence_newest_first() {
    let (store, product) = setup(0).await;
    let ledger = LedgerService::new(store);
    let now = chrono::Utc::now();

    let mut older = movement(product.id, MovementKind::Purchase, 1);
    older.occurred_at = Some(now - chrono::Duration::hours(5));
    let older = ledger.post_movement(older).await.unwrap();

    let latest = ledger
        .post_movement(movement(product.id, MovementKind::Purchase, 2))
        .await
        .unwrap();

    let mut middle = movement(product.id, MovementKind::Purchase, 3);
    middle.occurred_at = Some(now - chrono::Duration::hours(1));
    let middle = ledger.post_movement(middle).await.unwrap();

    let ids: Vec<_> = ledger.list().await.unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![latest.id, middle.id, older.id]);
    assert_eq!(ledger.get(middle.id).await.unwrap(), middle);
}

#[tokio::test]
async fn test_get_unknown_movement_is_not_found() {
    let (store, _) = setup(1).await;
    let ledger = LedgerService::new(store);
    assert!(matches!(
        ledger.get(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_product_movements_of_unknown_product_is_not_found() {
    let (store, _) = setup(1).await;
    let ledger = LedgerService::new(store);
    assert!(matches!(
        ledger.list_for_product(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_exceeding_stock_one_wins() {
    for _ in 0..20 {
        let (store, product) = setup(5).await;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = LedgerService::new(store.clone());
                let id = product.id;
                tokio::spawn(async move {
                    ledger
                        .post_movement(movement(id, MovementKind::Sale, 3))
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(AppError::InsufficientStock { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!((accepted, rejected), (1, 1));
        let stored = CatalogService::new(store).get(product.id).await.unwrap();
        assert_eq!(stored.current_stock, 2);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_postings_never_lose_updates() {
    let (store, product) = setup(100).await;

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let ledger = LedgerService::new(store.clone());
            let id = product.id;
            let kind = if i % 2 == 0 {
                MovementKind::Purchase
            } else {
                MovementKind::Sale
            };
            tokio::spawn(async move { ledger.post_movement(movement(id, kind, 3)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let ledger = LedgerService::new(store.clone());
    let movements = ledger.list_for_product(product.id).await.unwrap();
    let stored = CatalogService::new(store).get(product.id).await.unwrap();

    assert_eq!(movements.len(), 50);
    assert_eq!(stored.current_stock, 100);
    assert_eq!(stored.version, 51);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Stock always equals the initial stock plus the net change of the
    /// committed ledger, whatever mix of proposals was submitted.
    #[test]
    fn prop_stock_reconciles_with_ledger(
        initial in 0i32..50,
        proposals in prop::collection::vec((any::<bool>(), 1i32..20), 1..30),
    ) {
        tokio_test::block_on(async {
            let (store, product) = setup(initial).await;
            let ledger = LedgerService::new(store.clone());
            let catalog = CatalogService::new(store);

            for (is_sale, quantity) in proposals {
                let kind = if is_sale { MovementKind::Sale } else { MovementKind::Purchase };
                let before = catalog.get(product.id).await.unwrap().current_stock;

                match ledger.post_movement(movement(product.id, kind, quantity)).await {
                    Ok(_) => {}
                    Err(AppError::InsufficientStock { requested, available, .. }) => {
                        assert!(is_sale);
                        assert_eq!(available, before);
                        assert!(requested > available);
                    }
                    Err(other) => panic!("unexpected error: {:?}", other),
                }

                let stock = catalog.get(product.id).await.unwrap().current_stock;
                let movements = ledger.list_for_product(product.id).await.unwrap();
                assert!(stock >= 0);
                assert_eq!(i64::from(stock), i64::from(initial) + net_change(&movements));
            }
        });
    }
}
