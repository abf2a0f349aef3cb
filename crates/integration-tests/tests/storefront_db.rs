//! Storefront repositories against `PostgreSQL`.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `STOREFRONT_DATABASE_URL`. Migrations are applied automatically.
//!
//! Run with: cargo test -p shopkeep-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use shopkeep_core::{NewProduct, ProductId, Quantity, VatRate};
use shopkeep_integration_tests::{test_pool, unique_test_catalog};
use shopkeep_storefront::db::{CartRepository, ProductRepository, RepositoryError};

/// Seed a fresh copy of the test catalog and return the product IDs in order.
async fn seed_products(pool: &PgPool) -> Vec<ProductId> {
    let catalog = unique_test_catalog();
    let products = ProductRepository::new(pool);
    products.seed(&catalog).await.unwrap();

    let mut ids = Vec::new();
    for product in &catalog {
        ids.push(products.get_by_sku(&product.sku).await.unwrap().unwrap().id);
    }
    ids
}

fn new_session() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Seeding
// =============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_seeding_twice_is_idempotent() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);
    let catalog = unique_test_catalog();

    let first = products.seed(&catalog).await.unwrap();
    assert_eq!(first.inserted, 5);
    assert_eq!(first.skipped, 0);

    let second = products.seed(&catalog).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 5);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_create_duplicate_sku_conflicts() {
    let pool = test_pool().await;
    let products = ProductRepository::new(&pool);
    let product: NewProduct = unique_test_catalog().remove(0);

    let created = products.create(&product).await.unwrap();
    assert_eq!(created.sku, product.sku);
    assert_eq!(created.price, Decimal::from(100));

    let err = products.create(&product).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

// =============================================================================
// Cart totals
// =============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_cart_totals_for_three_and_five_products() {
    let pool = test_pool().await;
    let ids = seed_products(&pool).await;
    let carts = CartRepository::new(&pool);
    let vat = VatRate::new(Decimal::from(21)).unwrap();

    let three = carts.get_or_create(&new_session()).await.unwrap();
    for id in &ids[..3] {
        carts.add_product(three, *id, Quantity::ONE).await.unwrap();
    }
    assert_eq!(carts.total_price(three).await.unwrap(), Decimal::from(600));
    assert_eq!(
        carts.total_price_with_vat(three, vat).await.unwrap(),
        Decimal::from(726)
    );

    let five = carts.get_or_create(&new_session()).await.unwrap();
    for id in &ids {
        carts.add_product(five, *id, Quantity::ONE).await.unwrap();
    }
    assert_eq!(carts.total_price(five).await.unwrap(), Decimal::from(1500));
    assert_eq!(
        carts.total_price_with_vat(five, vat).await.unwrap(),
        Decimal::from(1815)
    );
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_add_same_product_twice_yields_one_line() {
    let pool = test_pool().await;
    let ids = seed_products(&pool).await;
    let carts = CartRepository::new(&pool);
    let cart_id = carts.get_or_create(&new_session()).await.unwrap();

    carts.add_product(cart_id, ids[0], Quantity::ONE).await.unwrap();
    carts
        .add_product(cart_id, ids[0], Quantity::new(2).unwrap())
        .await
        .unwrap();

    let items = carts.items(cart_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity.get(), 3);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_concurrent_adds_converge_on_one_line() {
    let pool = test_pool().await;
    let ids = seed_products(&pool).await;
    let session = new_session();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        let session = session.clone();
        let product = ids[1];
        handles.push(tokio::spawn(async move {
            let carts = CartRepository::new(&pool);
            let cart_id = carts.get_or_create(&session).await.unwrap();
            carts
                .add_product(cart_id, product, Quantity::ONE)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let carts = CartRepository::new(&pool);
    let cart_id = carts.get_by_session(&session).await.unwrap().unwrap();
    let items = carts.items(cart_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity.get(), 10);
    assert_eq!(carts.total_price(cart_id).await.unwrap(), Decimal::from(2000));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_load_matches_joined_lines() {
    let pool = test_pool().await;
    let ids = seed_products(&pool).await;
    let carts = CartRepository::new(&pool);
    let cart_id = carts.get_or_create(&new_session()).await.unwrap();

    carts
        .add_product(cart_id, ids[4], Quantity::new(2).unwrap())
        .await
        .unwrap();

    let cart = carts.load(cart_id).await.unwrap();
    let lines = carts.lines(cart_id).await.unwrap();
    assert_eq!(cart.items.len(), lines.len());
    assert_eq!(lines[0].title, "Test Product 5");
    assert_eq!(lines[0].amount().line_total(), Decimal::from(1000));
}
