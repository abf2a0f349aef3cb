//! Product records and the fixed seed catalogs.
//!
//! The storefront seeds [`demo_catalog`] for local development; tests use
//! [`test_catalog`] so their expected totals are round numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Sku};

/// A persisted catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Database ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unique merchant code.
    pub sku: Sku,
    /// Image filenames or URLs, first one is the primary image.
    pub images: Vec<String>,
    /// Long-form description.
    pub description: Option<String>,
    /// Unit price, excluding VAT.
    pub price: Decimal,
}

/// Errors found when validating a [`NewProduct`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// Title is blank.
    #[error("product {sku} has an empty title")]
    EmptyTitle {
        /// SKU of the offending product.
        sku: Sku,
    },
    /// Price is below zero.
    #[error("product {sku} has a negative price ({price})")]
    NegativePrice {
        /// SKU of the offending product.
        sku: Sku,
        /// The rejected price.
        price: Decimal,
    },
    /// Price does not fit the `NUMERIC(12, 2)` price column.
    #[error("product {sku} price {price} exceeds {max}", max = NewProduct::MAX_PRICE)]
    PriceTooHigh {
        /// SKU of the offending product.
        sku: Sku,
        /// The rejected price.
        price: Decimal,
    },
    /// Two products share a SKU.
    #[error("duplicate SKU {0}")]
    DuplicateSku(Sku),
}

/// A product that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub sku: Sku,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
}

impl NewProduct {
    /// Highest storable price, the limit of the `NUMERIC(12, 2)` column.
    pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    /// Check title and price.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError`] for a blank title or a price outside
    /// `0..=MAX_PRICE`.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.title.trim().is_empty() {
            return Err(ProductError::EmptyTitle {
                sku: self.sku.clone(),
            });
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ProductError::NegativePrice {
                sku: self.sku.clone(),
                price: self.price,
            });
        }
        if self.price > Self::MAX_PRICE {
            return Err(ProductError::PriceTooHigh {
                sku: self.sku.clone(),
                price: self.price,
            });
        }
        Ok(())
    }

    /// Attach a database ID.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            sku: self.sku,
            images: self.images,
            description: self.description,
            price: self.price,
        }
    }
}

/// Validate a whole catalog: every product individually plus SKU uniqueness.
///
/// Returns every problem found rather than stopping at the first.
#[must_use]
pub fn validate_catalog(products: &[NewProduct]) -> Vec<ProductError> {
    let mut errors: Vec<ProductError> = products
        .iter()
        .filter_map(|p| p.validate().err())
        .collect();

    let mut seen = std::collections::HashSet::new();
    for product in products {
        if !seen.insert(&product.sku) {
            errors.push(ProductError::DuplicateSku(product.sku.clone()));
        }
    }

    errors
}

/// Build a product from literals known to be valid.
fn fixture(
    title: &str,
    sku: &str,
    images: &[&str],
    description: &str,
    price: Decimal,
) -> NewProduct {
    NewProduct {
        title: title.to_owned(),
        // Covered by `test_fixture_skus_are_valid`.
        sku: Sku::new_unchecked(sku.to_owned()),
        images: images.iter().map(|s| (*s).to_owned()).collect(),
        description: Some(description.to_owned()),
        price,
    }
}

/// The five demo products seeded into a fresh storefront.
#[must_use]
pub fn demo_catalog() -> Vec<NewProduct> {
    vec![
        fixture(
            "Apple iPhone 16",
            "PHONE-X-001",
            &["phone-x-front.jpg", "phone-x-back.jpg"],
            "The latest smartphone with amazing features and performance.",
            Decimal::new(99999, 2),
        ),
        fixture(
            "Apple AirPods 3rd generation",
            "AUDIO-WH-002",
            &["headphones-1.jpg", "headphones-2.jpg"],
            "High-quality wireless headphones with noise cancellation.",
            Decimal::new(24999, 2),
        ),
        fixture(
            "Apple MacBook Pro",
            "COMP-LP-003",
            &["laptop-pro.jpg"],
            "Professional laptop for developers and designers.",
            Decimal::new(149_999, 2),
        ),
        fixture(
            "Apple Watch Series 10",
            "WATCH-SW-004",
            &["smartwatch-black.jpg", "smartwatch-silver.jpg"],
            "Track your fitness and stay connected with this smartwatch.",
            Decimal::new(34999, 2),
        ),
        fixture(
            "Wireless Earbuds",
            "AUDIO-WE-005",
            &["earbuds-case.jpg", "earbuds-white.jpg"],
            "Compact wireless earbuds with crystal clear sound.",
            Decimal::new(17999, 2),
        ),
    ]
}

/// Five products priced 100, 200, 300, 400 and 500.
#[must_use]
pub fn test_catalog() -> Vec<NewProduct> {
    (1..=5)
        .map(|n| NewProduct {
            title: format!("Test Product {n}"),
            sku: Sku::new_unchecked(format!("TEST-{n:03}")),
            images: Vec::new(),
            description: Some(format!("Test product description {n}")),
            price: Decimal::from(n * 100),
        })
        .collect()
}
