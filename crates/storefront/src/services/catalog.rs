//! Cached read access to the product catalog.
//!
//! Product reads go through a `moka` cache (5-minute TTL) in front of
//! [`ProductRepository`]. The cache holds whole `Product` values keyed by
//! [`CacheKey`]; seeding or editing products should call
//! [`CatalogService::invalidate_all`].

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use shopkeep_core::{Product, ProductId};

use crate::db::{ProductRepository, RepositoryError};

const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1000;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}

/// Catalog reads backed by the database and an in-memory cache.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service over `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// All products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the products cannot be loaded.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.inner.pool).list().await?);

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// A single product, or `None` when it does not exist.
    ///
    /// Misses are not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the product cannot be loaded.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let Some(product) = ProductRepository::new(&self.inner.pool)
            .get_by_id(id)
            .await?
        else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use uuid::Uuid;

    use shopkeep_core::{NewProduct, Sku};

    use super::*;
    use crate::db::{create_pool, run_migrations};

    fn unique_product() -> NewProduct {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
        NewProduct {
            title: "Cache Probe".to_owned(),
            sku: Sku::parse(&format!("CACHE-{}", suffix.to_uppercase())).unwrap(),
            images: Vec::new(),
            description: None,
            price: Decimal::from(10),
        }
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_list_is_cached_until_invalidated() {
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/shopkeep_test".to_owned());
        let pool = create_pool(&SecretString::from(url)).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let catalog = CatalogService::new(pool.clone());
        let before = catalog.list().await.unwrap();

        let product = unique_product();
        let created = ProductRepository::new(&pool).create(&product).await.unwrap();

        let cached = catalog.list().await.unwrap();
        assert!(Arc::ptr_eq(&before, &cached));
        assert!(!cached.iter().any(|p| p.sku == product.sku));

        catalog.invalidate_all().await;
        let fresh = catalog.list().await.unwrap();
        assert!(fresh.iter().any(|p| p.sku == product.sku));
        assert_eq!(catalog.get(created.id).await.unwrap(), Some(created));
    }
}
