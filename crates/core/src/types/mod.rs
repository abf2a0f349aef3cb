//! Core types for Shopkeep.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;
pub mod sku;

pub use id::*;
pub use price::{CurrencyCode, Price, VatRate, VatRateError};
pub use quantity::{Quantity, QuantityError};
pub use sku::{Sku, SkuError};
