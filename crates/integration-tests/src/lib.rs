//! Integration tests for Shopkeep.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure cart and catalog properties
//! cargo test -p shopkeep-integration-tests
//!
//! # Database and HTTP tests (need PostgreSQL and, for HTTP, a running storefront)
//! shopkeep migrate
//! cargo test -p shopkeep-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_totals` - Cart totals over the test catalog, no I/O
//! - `storefront_db` - Repositories against `PostgreSQL`
//! - `storefront_http` - The running storefront over HTTP

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use shopkeep_core::{NewProduct, Sku, test_catalog};
use shopkeep_storefront::db::{create_pool, run_migrations};

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Database URL for tests, defaulting to a local test database.
#[must_use]
pub fn database_url() -> SecretString {
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| "postgres://localhost/shopkeep_test".to_string())
        .into()
}

/// Migrations run once per test binary.
static MIGRATIONS: OnceCell<()> = OnceCell::const_new();

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if the database is unreachable or a migration fails.
pub async fn test_pool() -> PgPool {
    let pool = create_pool(&database_url())
        .await
        .expect("Failed to connect to test database");
    MIGRATIONS
        .get_or_init(|| async {
            run_migrations(&pool)
                .await
                .expect("Failed to run migrations");
        })
        .await;
    pool
}

/// The test catalog with a per-run SKU suffix so runs do not collide.
///
/// # Panics
///
/// Panics if a suffixed SKU is invalid, which would be a bug in the catalog.
#[must_use]
pub fn unique_test_catalog() -> Vec<NewProduct> {
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = suffix.get(..8).unwrap_or(&suffix).to_owned();

    test_catalog()
        .into_iter()
        .map(|product| NewProduct {
            sku: Sku::parse(&format!("{}-{suffix}", product.sku)).expect("valid SKU"),
            ..product
        })
        .collect()
}

/// Sum of the test catalog prices, 100 + 200 + 300 + 400 + 500.
#[must_use]
pub fn test_catalog_total() -> Decimal {
    test_catalog().iter().map(|p| p.price).sum()
}

/// HTTP client that keeps the session cookie between requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
