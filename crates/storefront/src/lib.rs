//! Shopkeep Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. The `shopkeep-storefront` binary
//! wires it to configuration, tracing and Sentry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the full storefront application.
///
/// Layers, innermost first: sessions, request ID, request tracing, Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .with_state(state)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::header;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    /// App over a pool that never connects; only DB-free routes are usable.
    fn test_app() -> Router {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "STOREFRONT_DATABASE_URL").then(|| "postgres://localhost/unused".to_owned())
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        app(AppState::new(config, pool))
    }

    async fn get(uri: &str) -> axum::response::Response {
        test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_home_redirects_to_products() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products");
    }

    #[tokio::test]
    async fn test_styleguide_renders_every_story() {
        let response = get("/styleguide/product-card").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        for slug in [
            "default",
            "on-sale",
            "in-cart",
            "no-image",
            "short-description",
            "no-description",
        ] {
            assert!(html.contains(&format!("id=\"{slug}\"")), "missing {slug}");
        }
        assert!(html.contains("iPhone 16 5G 128GB"));
        assert!(html.contains("-10%"));
        assert!(html.contains("<s class=\"product-card__price-original\">€999.99</s>"));
    }

    #[tokio::test]
    async fn test_styleguide_single_story() {
        let response = get("/styleguide/product-card/no-image").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("product-card__placeholder"));
        assert!(!html.contains("iphone-green.avif"));
    }

    #[tokio::test]
    async fn test_styleguide_unknown_story_is_not_found() {
        let response = get("/styleguide/product-card/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
