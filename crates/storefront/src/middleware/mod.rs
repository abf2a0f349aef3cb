//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)

pub mod cart_session;
pub mod request_id;
pub mod session;

pub use cart_session::{CartSession, ensure_cart_session_id};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
