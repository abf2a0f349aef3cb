//! Cart ownership through the browser session.
//!
//! A cart belongs to an opaque UUID stored in the session under
//! [`CART_SESSION_ID`]. The ID is created on the first add to cart, so
//! visitors who only browse never get a cart row.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::models::session_keys::CART_SESSION_ID;

/// Extractor for the visitor's cart session ID, if one exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CartSession(cart_session): CartSession) -> impl IntoResponse {
///     match cart_session {
///         Some(id) => format!("cart owner {id}"),
///         None => "no cart yet".to_string(),
///     }
/// }
/// ```
pub struct CartSession(pub Option<String>);

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cart_session = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<String>(CART_SESSION_ID)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(cart_session))
    }
}

/// Return the session's cart session ID, creating one if needed.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn ensure_cart_session_id(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    if let Some(id) = session.get::<String>(CART_SESSION_ID).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    session.insert(CART_SESSION_ID, &id).await?;
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_ensure_cart_session_id_is_stable() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let first = ensure_cart_session_id(&session).await.unwrap();
        let second = ensure_cart_session_id(&session).await.unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(
            session.get::<String>(CART_SESSION_ID).await.unwrap(),
            Some(first)
        );
    }
}
