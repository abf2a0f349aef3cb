//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Cached product reads

pub mod catalog;

pub use catalog::CatalogService;
