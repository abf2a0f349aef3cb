//! Product repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use shopkeep_core::{NewProduct, Product, ProductId, Sku};

use super::RepositoryError;

/// Database row for `storefront.product`.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    title: String,
    sku: String,
    images: Vec<String>,
    description: Option<String>,
    price: Decimal,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let sku = Sku::parse(&row.sku).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid SKU in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            title: row.title,
            sku,
            images: row.images,
            description: row.description,
            price: row.price,
        })
    }
}

/// Outcome of seeding a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Products newly inserted.
    pub inserted: usize,
    /// Products skipped because their SKU already existed.
    pub skipped: usize,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored SKU is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, sku, images, description, price
            FROM storefront.product
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored SKU is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, sku, images, description, price
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get a product by its SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored SKU is invalid.
    pub async fn get_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, sku, images, description, price
            FROM storefront.product
            WHERE sku = $1
            ",
        )
        .bind(sku)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, product), fields(sku = %product.sku))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO storefront.product (title, sku, images, description, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, sku, images, description, price
            ",
        )
        .bind(&product.title)
        .bind(&product.sku)
        .bind(&product.images)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("SKU {} already exists", product.sku));
            }
            RepositoryError::Database(e)
        })?;

        debug!(id = row.id, "Inserted product");
        Product::try_from(row)
    }

    /// Insert a catalog in one transaction, skipping SKUs that already exist.
    ///
    /// Running the same seed twice leaves the table unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// committed in that case.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn seed(&self, products: &[NewProduct]) -> Result<SeedReport, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut report = SeedReport::default();

        for product in products {
            let inserted: Option<(i32,)> = sqlx::query_as(
                r"
                INSERT INTO storefront.product (title, sku, images, description, price)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (sku) DO NOTHING
                RETURNING id
                ",
            )
            .bind(&product.title)
            .bind(&product.sku)
            .bind(&product.images)
            .bind(&product.description)
            .bind(product.price)
            .fetch_optional(&mut *tx)
            .await?;

            if inserted.is_some() {
                report.inserted += 1;
            } else {
                debug!(sku = %product.sku, "Product already exists, skipping");
                report.skipped += 1;
            }
        }

        tx.commit().await?;

        Ok(report)
    }

    /// Count catalog products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storefront.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
