//! Home page route handler.

use axum::response::Redirect;

/// The product grid is the landing page.
pub async fn home() -> Redirect {
    Redirect::to("/products")
}
