//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use shopkeep_core::card::image_url;
use shopkeep_core::{ProductCard, ProductCardView, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CartSession;
use crate::routes::cart::cart_product_ids;
use crate::state::AppState;

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub cards: Vec<ProductCardView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub card: ProductCardView,
    pub images: Vec<String>,
}

/// Display product listing page.
#[instrument(skip(state, cart_session))]
pub async fn index(
    State(state): State<AppState>,
    CartSession(cart_session): CartSession,
) -> Result<impl IntoResponse> {
    let products = state.catalog().list().await?;
    let in_cart = cart_product_ids(&state, cart_session.as_deref()).await?;
    let currency = state.config().currency;

    let cards = products
        .iter()
        .map(|product| {
            ProductCard::new(product.clone())
                .in_cart(in_cart.contains(&product.id))
                .view(currency)
        })
        .collect();

    Ok(ProductsIndexTemplate { cards })
}

/// Display product detail page.
#[instrument(skip(state, cart_session))]
pub async fn show(
    State(state): State<AppState>,
    CartSession(cart_session): CartSession,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let in_cart = cart_product_ids(&state, cart_session.as_deref()).await?;
    let images = product.images.iter().map(|i| image_url(i)).collect();
    let card = ProductCard::new(product)
        .in_cart(in_cart.contains(&id))
        .description_length(usize::MAX)
        .view(state.config().currency);

    Ok(ProductShowTemplate { card, images })
}
