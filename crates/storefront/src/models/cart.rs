//! Cart views for the cart page and the JSON cart API.

use rust_decimal::Decimal;
use serde::Serialize;

use shopkeep_core::card::image_url;
use shopkeep_core::{CartTotals, CurrencyCode, LineAmount, Price, ProductId, VatRate};

use crate::db::carts::CartLine;

/// One cart line formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub title: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

/// The cart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: i64,
    pub subtotal: String,
    pub vat_rate: String,
    pub vat: String,
    pub total: String,
}

impl CartView {
    /// An empty cart at `vat_rate`.
    #[must_use]
    pub fn empty(vat_rate: VatRate, currency: CurrencyCode) -> Self {
        Self::from_lines(&[], vat_rate, currency)
    }

    /// Build the cart page from joined cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine], vat_rate: VatRate, currency: CurrencyCode) -> Self {
        let amounts: Vec<LineAmount> = lines.iter().map(CartLine::amount).collect();
        let totals = CartTotals::from_lines(&amounts, vat_rate);
        let fmt = |amount: Decimal| Price::new(amount, currency).display();

        Self {
            items: lines
                .iter()
                .map(|line| CartItemView {
                    product_id: line.product_id,
                    title: line.title.clone(),
                    sku: line.sku.to_string(),
                    image_url: line.image.as_deref().map(image_url),
                    quantity: line.quantity.get(),
                    unit_price: fmt(line.unit_price),
                    line_total: fmt(line.amount().line_total()),
                })
                .collect(),
            item_count: totals.item_count,
            subtotal: fmt(totals.subtotal),
            vat_rate: totals.vat_rate.to_string(),
            vat: fmt(totals.vat),
            total: fmt(totals.total),
        }
    }

    /// `true` when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A cart line in the JSON summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummaryItem {
    pub product_id: ProductId,
    pub title: String,
    pub sku: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// JSON body of `GET /api/cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartSummaryItem>,
    pub currency: &'static str,
    #[serde(flatten)]
    pub totals: CartTotals,
}

impl CartSummary {
    /// Build the summary from joined cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine], vat_rate: VatRate, currency: CurrencyCode) -> Self {
        let amounts: Vec<LineAmount> = lines.iter().map(CartLine::amount).collect();

        Self {
            items: lines
                .iter()
                .map(|line| CartSummaryItem {
                    product_id: line.product_id,
                    title: line.title.clone(),
                    sku: line.sku.to_string(),
                    quantity: line.quantity.get(),
                    unit_price: line.unit_price,
                    line_total: line.amount().line_total(),
                })
                .collect(),
            currency: currency.code(),
            totals: CartTotals::from_lines(&amounts, vat_rate),
        }
    }
}
