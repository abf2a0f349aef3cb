//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /products
//!
//! # Products
//! GET  /products               - Product grid
//! GET  /products/{id}          - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page with subtotal, VAT and total
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # API
//! GET  /api/cart               - Cart summary (JSON)
//!
//! # Styleguide
//! GET  /styleguide/product-card          - Every product card story
//! GET  /styleguide/product-card/{story}  - One product card story
//! ```

pub mod cart;
pub mod home;
pub mod products;
pub mod styleguide;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/count", get(cart::count))
}

/// Create the styleguide routes router.
pub fn styleguide_routes() -> Router<AppState> {
    Router::new()
        .route("/product-card", get(styleguide::product_card))
        .route("/product-card/{story}", get(styleguide::product_card_story))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/api/cart", get(cart::summary))
        .nest("/styleguide", styleguide_routes())
}
