//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart is owned by a UUID stored in the session and created on the
//! first add.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopkeep_core::{ProductId, Quantity};

use crate::db::CartRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CartSession, ensure_cart_session_id};
use crate::models::{CartSummary, CartView};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<i64>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Product IDs in the visitor's cart; empty when there is no cart yet.
pub(crate) async fn cart_product_ids(
    state: &AppState,
    cart_session: Option<&str>,
) -> Result<HashSet<ProductId>> {
    let Some(cart_session) = cart_session else {
        return Ok(HashSet::new());
    };

    let carts = CartRepository::new(state.pool());
    let Some(cart_id) = carts.get_by_session(cart_session).await? else {
        return Ok(HashSet::new());
    };

    Ok(carts
        .items(cart_id)
        .await?
        .into_iter()
        .map(|item| item.product_id)
        .collect())
}

/// Display cart page.
#[instrument(skip(state, cart_session))]
pub async fn show(
    State(state): State<AppState>,
    CartSession(cart_session): CartSession,
) -> Result<impl IntoResponse> {
    let config = state.config();
    let carts = CartRepository::new(state.pool());

    let cart_id = match cart_session {
        Some(session_id) => carts.get_by_session(&session_id).await?,
        None => None,
    };

    let cart = match cart_id {
        Some(cart_id) => {
            let lines = carts.lines(cart_id).await?;
            CartView::from_lines(&lines, config.vat_rate, config.currency)
        }
        None => CartView::empty(config.vat_rate, config.currency),
    };

    Ok(CartShowTemplate { cart })
}

/// Add item to cart (HTMX).
///
/// Creates the cart on first use. Returns the updated count badge with an
/// HTMX trigger so other cart widgets refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = Quantity::new(form.quantity.unwrap_or(1))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let product_id = ProductId::new(form.product_id);

    let session_id = ensure_cart_session_id(&session).await?;
    let carts = CartRepository::new(state.pool());
    let cart_id = carts.get_or_create(&session_id).await?;
    let item = carts.add_product(cart_id, product_id, quantity).await?;

    let (product, line_quantity) = (product_id.to_string(), item.quantity.to_string());
    add_breadcrumb(
        "cart",
        "Added product to cart",
        Some(&[
            ("product_id", product.as_str()),
            ("line_quantity", line_quantity.as_str()),
        ]),
    );

    let count = carts.item_count(cart_id).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Get cart count badge (HTMX fragment).
#[instrument(skip(state, cart_session))]
pub async fn count(
    State(state): State<AppState>,
    CartSession(cart_session): CartSession,
) -> Result<impl IntoResponse> {
    let carts = CartRepository::new(state.pool());

    let cart_id = match cart_session {
        Some(session_id) => carts.get_by_session(&session_id).await?,
        None => None,
    };

    let count = match cart_id {
        Some(cart_id) => carts.item_count(cart_id).await?,
        None => 0,
    };

    Ok(CartCountTemplate { count })
}

/// Cart contents and totals as JSON.
#[instrument(skip(state, cart_session))]
pub async fn summary(
    State(state): State<AppState>,
    CartSession(cart_session): CartSession,
) -> Result<Json<CartSummary>> {
    let config = state.config();
    let carts = CartRepository::new(state.pool());

    let cart_id = match cart_session {
        Some(session_id) => carts.get_by_session(&session_id).await?,
        None => None,
    };

    let lines = match cart_id {
        Some(cart_id) => carts.lines(cart_id).await?,
        None => Vec::new(),
    };

    Ok(Json(CartSummary::from_lines(
        &lines,
        config.vat_rate,
        config.currency,
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_count_fragment() {
        let html = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(html.contains(">3</span>"));
        assert!(html.contains("id=\"cart-count\""));
        assert!(!html.contains("cart-count--empty"));
    }

    #[test]
    fn test_empty_cart_count_fragment() {
        let html = CartCountTemplate { count: 0 }.render().unwrap();
        assert!(html.contains("cart-count--empty"));
    }

    fn cart_page(quantities: &[i64]) -> String {
        use rust_decimal::Decimal;
        use shopkeep_core::{CartItemId, CurrencyCode, Sku, VatRate};

        use crate::db::carts::CartLine;

        let lines: Vec<CartLine> = quantities
            .iter()
            .zip(1..)
            .map(|(&quantity, id)| CartLine {
                item_id: CartItemId::new(id),
                product_id: ProductId::new(id),
                title: format!("Test Product {id}"),
                sku: Sku::parse(&format!("TEST-00{id}")).unwrap(),
                image: None,
                unit_price: Decimal::from(100 * i64::from(id)),
                quantity: Quantity::new(quantity).unwrap(),
            })
            .collect();
        let vat = VatRate::new(Decimal::from(21)).unwrap();
        let cart = CartView::from_lines(&lines, vat, CurrencyCode::EUR);

        CartShowTemplate { cart }.render().unwrap()
    }

    #[test]
    fn test_cart_page_totals() {
        let html = cart_page(&[1, 1, 1]);
        assert!(html.contains("Subtotal (3 items)"));
        assert!(html.contains("VAT (21%)"));
        assert!(html.contains("<strong>€726.00</strong>"));
    }

    #[test]
    fn test_cart_page_single_item_label() {
        let html = cart_page(&[1]);
        assert!(html.contains("Subtotal (1 item)"));
    }

    #[test]
    fn test_empty_cart_page() {
        let html = cart_page(&[]);
        assert!(html.contains("Your cart is empty."));
    }

    async fn parse_form(body: &'static str) -> AddToCartForm {
        use axum::{body::Body, extract::FromRequest, http::header};

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/cart/add")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let Form(form) = Form::<AddToCartForm>::from_request(request, &())
            .await
            .unwrap();
        form
    }

    #[tokio::test]
    async fn test_add_to_cart_form_quantity_is_optional() {
        let form = parse_form("product_id=4").await;
        assert_eq!(form.product_id, 4);
        assert_eq!(form.quantity, None);

        let form = parse_form("product_id=4&quantity=2").await;
        assert_eq!(form.quantity, Some(2));
    }
}
