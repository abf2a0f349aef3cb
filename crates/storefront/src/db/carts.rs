//! Cart repository for database operations.
//!
//! Every mutation is a single statement. Adding a product relies on the
//! `(cart_id, product_id)` unique constraint so concurrent adds of the same
//! product converge on one line with the summed quantity.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use shopkeep_core::{
    Cart, CartId, CartItem, CartItemId, CartTotals, LineAmount, ProductId, Quantity, Sku, VatRate,
    total_price, total_price_with_vat,
};

use super::RepositoryError;

/// `numeric_value_out_of_range`, raised when a summed quantity overflows.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Database row for `storefront.cart`.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    session_id: String,
}

/// Database row for `storefront.cart_item`.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CartItemId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            product_id: ProductId::new(row.product_id),
            quantity: quantity_from_db(row.quantity)?,
        })
    }
}

/// Database row for a cart line joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    product_id: i32,
    title: String,
    sku: String,
    images: Vec<String>,
    unit_price: Decimal,
    quantity: i32,
}

/// A cart line with the product fields needed to display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub title: String,
    pub sku: Sku,
    /// First product image, if any.
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: Quantity,
}

impl CartLine {
    /// Price and quantity of this line.
    #[must_use]
    pub const fn amount(&self) -> LineAmount {
        LineAmount::new(self.unit_price, self.quantity)
    }
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let sku = Sku::parse(&row.sku).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid SKU in database: {e}"))
        })?;

        Ok(Self {
            item_id: CartItemId::new(row.item_id),
            product_id: ProductId::new(row.product_id),
            title: row.title,
            sku,
            image: row.images.into_iter().next(),
            unit_price: row.unit_price,
            quantity: quantity_from_db(row.quantity)?,
        })
    }
}

fn quantity_from_db(value: i32) -> Result<Quantity, RepositoryError> {
    Quantity::try_from(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid quantity in database: {e}")))
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the cart owned by a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_session(&self, session_id: &str) -> Result<Option<CartId>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, session_id
            FROM storefront.cart
            WHERE session_id = $1
            ",
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| CartId::new(r.id)))
    }

    /// Return the session's cart, creating it if needed.
    ///
    /// Concurrent first requests for one session resolve to the same cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, session_id: &str) -> Result<CartId, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO storefront.cart (session_id)
            VALUES ($1)
            ON CONFLICT (session_id) DO UPDATE SET updated_at = NOW()
            RETURNING id, session_id
            ",
        )
        .bind(session_id)
        .fetch_one(self.pool)
        .await?;

        debug!(cart_id = row.id, "Resolved cart for session");
        Ok(CartId::new(row.id))
    }

    /// Add `quantity` of a product to a cart.
    ///
    /// Creates the line or increments the existing one in a single statement
    /// and returns the resulting line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart or product does not exist.
    /// Returns `RepositoryError::Conflict` if the summed quantity overflows.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(quantity = quantity.get()))]
    pub async fn add_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO storefront.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE
                SET quantity = storefront.cart_item.quantity + EXCLUDED.quantity,
                    updated_at = NOW()
            RETURNING id, cart_id, product_id, quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity.get())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound(format!("product {product_id}"));
            }
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE)
            {
                return RepositoryError::Conflict(format!(
                    "quantity of product {product_id} is too large"
                ));
            }
            RepositoryError::Database(e)
        })?;

        debug!(item_id = row.id, total = row.quantity, "Upserted cart item");
        CartItem::try_from(row)
    }

    /// All line items in a cart, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, cart_id, product_id, quantity
            FROM storefront.cart_item
            WHERE cart_id = $1
            ORDER BY id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }

    /// Load a cart with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn load(&self, cart_id: CartId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, session_id FROM storefront.cart WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("cart {cart_id}")))?;

        let mut cart = Cart::new(CartId::new(row.id), row.session_id);
        cart.items = self.items(cart_id).await?;
        Ok(cart)
    }

    /// Cart lines joined with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.id AS item_id,
                   p.id AS product_id,
                   p.title,
                   p.sku,
                   p.images,
                   p.price AS unit_price,
                   ci.quantity
            FROM storefront.cart_item ci
            JOIN storefront.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Price and quantity of every line in a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_amounts(&self, cart_id: CartId) -> Result<Vec<LineAmount>, RepositoryError> {
        let rows: Vec<(Decimal, i32)> = sqlx::query_as(
            r"
            SELECT p.price, ci.quantity
            FROM storefront.cart_item ci
            JOIN storefront.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(price, quantity)| Ok(LineAmount::new(price, quantity_from_db(quantity)?)))
            .collect()
    }

    /// Total excluding VAT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_price(&self, cart_id: CartId) -> Result<Decimal, RepositoryError> {
        Ok(total_price(&self.line_amounts(cart_id).await?))
    }

    /// Total including VAT at `vat_rate`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_price_with_vat(
        &self,
        cart_id: CartId,
        vat_rate: VatRate,
    ) -> Result<Decimal, RepositoryError> {
        Ok(total_price_with_vat(
            &self.line_amounts(cart_id).await?,
            vat_rate,
        ))
    }

    /// Totals summary for a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(
        &self,
        cart_id: CartId,
        vat_rate: VatRate,
    ) -> Result<CartTotals, RepositoryError> {
        Ok(CartTotals::from_lines(
            &self.line_amounts(cart_id).await?,
            vat_rate,
        ))
    }

    /// Number of units in a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_count(&self, cart_id: CartId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM storefront.cart_item WHERE cart_id = $1",
        )
        .bind(cart_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use tokio::sync::OnceCell;

    use shopkeep_core::test_catalog;

    use super::*;
    use crate::db::{ProductRepository, create_pool, run_migrations};

    static SETUP: OnceCell<()> = OnceCell::const_new();

    async fn test_pool() -> PgPool {
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/shopkeep_test".to_owned());
        let pool = create_pool(&SecretString::from(url)).await.unwrap();
        SETUP
            .get_or_init(|| async {
                run_migrations(&pool).await.unwrap();
                ProductRepository::new(&pool)
                    .seed(&test_catalog())
                    .await
                    .unwrap();
            })
            .await;
        pool
    }

    async fn product_id(pool: &PgPool, sku: &str) -> ProductId {
        ProductRepository::new(pool)
            .get_by_sku(&Sku::parse(sku).unwrap())
            .await
            .unwrap()
            .unwrap()
            .id
    }

    fn session() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    #[test]
    fn test_cart_line_amount() {
        let line = CartLine {
            item_id: CartItemId::new(1),
            product_id: ProductId::new(2),
            title: "Test Product 2".to_owned(),
            sku: Sku::parse("TEST-002").unwrap(),
            image: None,
            unit_price: Decimal::from(200),
            quantity: Quantity::new(3).unwrap(),
        };
        assert_eq!(line.amount().line_total(), Decimal::from(600));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_get_or_create_is_stable() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let session_id = session();

        let first = repo.get_or_create(&session_id).await.unwrap();
        let second = repo.get_or_create(&session_id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.get_by_session(&session_id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_add_same_product_twice_merges_line() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let cart_id = repo.get_or_create(&session()).await.unwrap();
        let product = product_id(&pool, "TEST-001").await;

        repo.add_product(cart_id, product, Quantity::ONE)
            .await
            .unwrap();
        let item = repo
            .add_product(cart_id, product, Quantity::new(2).unwrap())
            .await
            .unwrap();

        assert_eq!(item.quantity.get(), 3);
        assert_eq!(repo.items(cart_id).await.unwrap().len(), 1);
        assert_eq!(
            repo.total_price(cart_id).await.unwrap(),
            Decimal::from(300)
        );
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_totals_with_vat() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let cart_id = repo.get_or_create(&session()).await.unwrap();
        for sku in ["TEST-001", "TEST-002", "TEST-003"] {
            let product = product_id(&pool, sku).await;
            repo.add_product(cart_id, product, Quantity::ONE)
                .await
                .unwrap();
        }

        let vat = VatRate::new(Decimal::from(21)).unwrap();
        assert_eq!(repo.total_price(cart_id).await.unwrap(), Decimal::from(600));
        assert_eq!(
            repo.total_price_with_vat(cart_id, vat).await.unwrap(),
            Decimal::from(726)
        );
        assert_eq!(repo.item_count(cart_id).await.unwrap(), 3);
        assert_eq!(repo.lines(cart_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_add_unknown_product_is_not_found() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let cart_id = repo.get_or_create(&session()).await.unwrap();

        let err = repo
            .add_product(cart_id, ProductId::new(i32::MAX), Quantity::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_quantity_overflow_conflicts_and_keeps_line() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let cart_id = repo.get_or_create(&session()).await.unwrap();
        let product = product_id(&pool, "TEST-004").await;
        let max = Quantity::new(i64::from(i32::MAX)).unwrap();

        repo.add_product(cart_id, product, max).await.unwrap();
        let err = repo
            .add_product(cart_id, product, Quantity::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)), "got {err}");

        let items = repo.items(cart_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, max);
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL"]
    async fn test_empty_cart_totals_are_zero() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let cart_id = repo.get_or_create(&session()).await.unwrap();

        let totals = repo.totals(cart_id, VatRate::default()).await.unwrap();
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
        assert!(repo.load(cart_id).await.unwrap().is_empty());
    }
}
