//! Session-related types.
//!
//! Keys for values stored in the tower-sessions session.

/// Session keys for cart data.
pub mod keys {
    /// Key for the opaque identifier that owns the visitor's cart.
    pub const CART_SESSION_ID: &str = "cart_session_id";
}
