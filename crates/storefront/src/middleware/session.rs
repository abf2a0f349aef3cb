//! Cookie sessions backed by `PostgreSQL`.
//!
//! The session carries only the cart session id (see
//! [`crate::middleware::cart_session`]); cart contents live in the
//! `storefront.cart` tables.

use sqlx::PgPool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopkeep_session";

/// Days of inactivity before a visitor's session, and with it their cart
/// handle, is dropped.
const CART_SESSION_DAYS: i64 = 7;

/// Session layer over the `tower_sessions.session` table.
///
/// The table is created by [`crate::db::run_migrations`]. Cookies are marked
/// secure when the storefront is served over https.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(CART_SESSION_DAYS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
}
