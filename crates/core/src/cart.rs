//! Cart aggregate, line-item upsert and total calculation.
//!
//! Totals are computed by pure functions over [`LineAmount`] pairs. The
//! in-memory [`Cart`] resolves its items against a product list to build
//! those pairs; the storefront loads them with a join instead.
//!
//! ```
//! use rust_decimal::Decimal;
//! use shopkeep_core::{LineAmount, Quantity, VatRate, total_price, total_price_with_vat};
//!
//! let lines = [
//!     LineAmount::new(Decimal::from(100), Quantity::ONE),
//!     LineAmount::new(Decimal::from(200), Quantity::ONE),
//!     LineAmount::new(Decimal::from(300), Quantity::ONE),
//! ];
//! let vat = VatRate::new(Decimal::from(21)).unwrap();
//!
//! assert_eq!(total_price(&lines), Decimal::from(600));
//! assert_eq!(total_price_with_vat(&lines, vat), Decimal::from(726));
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{CartId, CartItemId, ProductId, Quantity, QuantityError, VatRate};

/// Errors from in-memory cart operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A line item references a product missing from the supplied catalog.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    /// Quantity arithmetic failed.
    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

/// Unit price and quantity of one line, the only inputs totals need.
///
/// Prices are expected within `0..=NewProduct::MAX_PRICE`, as stored in the
/// catalog. With a [`VatRate`] of at most 100% every total then fits in a
/// `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmount {
    pub unit_price: Decimal,
    pub quantity: Quantity,
}

impl LineAmount {
    /// Create a line amount.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: Quantity) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// Sum of `price × quantity` over all lines. Zero for no lines.
#[must_use]
pub fn total_price(lines: &[LineAmount]) -> Decimal {
    lines.iter().map(LineAmount::line_total).sum()
}

/// [`total_price`] with VAT applied.
#[must_use]
pub fn total_price_with_vat(lines: &[LineAmount], vat_rate: VatRate) -> Decimal {
    vat_rate.apply(total_price(lines))
}

/// Summary of a cart for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Number of units across all lines.
    pub item_count: i64,
    /// Total excluding VAT.
    pub subtotal: Decimal,
    pub vat_rate: VatRate,
    /// VAT portion (`total - subtotal`).
    pub vat: Decimal,
    /// Total including VAT.
    pub total: Decimal,
}

impl CartTotals {
    /// Compute totals for `lines` at `vat_rate`.
    #[must_use]
    pub fn from_lines(lines: &[LineAmount], vat_rate: VatRate) -> Self {
        let subtotal = total_price(lines);
        let total = vat_rate.apply(subtotal);
        Self {
            item_count: lines.iter().map(|l| i64::from(l.quantity.get())).sum(),
            subtotal,
            vat_rate,
            vat: total - subtotal,
            total,
        }
    }
}

/// One product and its quantity within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// A session-scoped cart holding at most one item per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    /// Opaque identifier of the browser session that owns the cart.
    pub session_id: String,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new(id: CartId, session_id: impl Into<String>) -> Self {
        Self {
            id,
            session_id: session_id.into(),
            items: Vec::new(),
        }
    }

    /// Add `quantity` of a product.
    ///
    /// Increments the existing line for `product_id` if there is one,
    /// otherwise appends a new line. Returns the resulting line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Quantity`] if the new quantity overflows.
    pub fn add_product(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = item.quantity.checked_add(quantity)?;
            return Ok(item.clone());
        }

        let next_id = self
            .items
            .iter()
            .map(|i| i.id.as_i32())
            .max()
            .unwrap_or(0)
            + 1;
        let item = CartItem {
            id: CartItemId::new(next_id),
            cart_id: self.id,
            product_id,
            quantity,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// `true` when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve every line's unit price from `products`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if a line's product is missing.
    pub fn line_amounts(&self, products: &[Product]) -> Result<Vec<LineAmount>, CartError> {
        let prices: HashMap<ProductId, Decimal> =
            products.iter().map(|p| (p.id, p.price)).collect();

        self.items
            .iter()
            .map(|item| {
                prices
                    .get(&item.product_id)
                    .map(|price| LineAmount::new(*price, item.quantity))
                    .ok_or(CartError::UnknownProduct(item.product_id))
            })
            .collect()
    }

    /// Total excluding VAT.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if a line's product is missing.
    pub fn total_price(&self, products: &[Product]) -> Result<Decimal, CartError> {
        Ok(total_price(&self.line_amounts(products)?))
    }

    /// Total including VAT at `vat_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if a line's product is missing.
    pub fn total_price_with_vat(
        &self,
        products: &[Product],
        vat_rate: VatRate,
    ) -> Result<Decimal, CartError> {
        Ok(total_price_with_vat(&self.line_amounts(products)?, vat_rate))
    }

    /// Full totals summary.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if a line's product is missing.
    pub fn totals(&self, products: &[Product], vat_rate: VatRate) -> Result<CartTotals, CartError> {
        Ok(CartTotals::from_lines(
            &self.line_amounts(products)?,
            vat_rate,
        ))
    }
}
