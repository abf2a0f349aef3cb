//! View models for storefront.
//!
//! Types rendered by templates or serialized to JSON, built from core types
//! and repository rows.

pub mod cart;
pub mod session;

pub use cart::{CartItemView, CartSummary, CartView};
pub use session::keys as session_keys;
