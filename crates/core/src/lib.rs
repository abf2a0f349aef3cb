//! Shopkeep Core - Shared types and cart logic.
//!
//! This crate provides the domain pieces used across all Shopkeep components:
//! - `storefront` - Public-facing shop (catalog, cart, product cards)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Cart totals are computed from plain `(price, quantity)`
//! pairs so the same arithmetic serves the in-memory [`Cart`] and the
//! database-backed cart in the storefront.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, SKUs, quantities, prices and VAT rates
//! - [`cart`] - Cart aggregate, line-item upsert and total calculation
//! - [`catalog`] - Product records and the fixed seed catalogs
//! - [`card`] - Product card view logic and its story fixtures

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod card;
pub mod cart;
pub mod catalog;
pub mod types;

pub use card::{ProductCard, ProductCardStory, ProductCardView};
pub use cart::{
    Cart, CartError, CartItem, CartTotals, LineAmount, total_price, total_price_with_vat,
};
pub use catalog::{
    NewProduct, Product, ProductError, demo_catalog, test_catalog, validate_catalog,
};
pub use types::*;
