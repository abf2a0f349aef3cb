//! Integer IDs for products, carts and cart lines.
//!
//! Each table gets its own newtype, so a `CartId` cannot be passed where a
//! `ProductId` is expected.

/// Define an `i32` ID newtype.
///
/// The generated type is `Copy`, ordered and hashable, serializes as a bare
/// number, converts to and from `i32`, and (with the `postgres` feature)
/// binds and decodes as a Postgres `INTEGER`.
///
/// # Example
///
/// ```rust
/// # use shopkeep_core::define_id;
/// define_id!(WishlistId);
/// define_id!(ReviewId);
///
/// let wishlist = WishlistId::new(1);
/// assert_eq!(wishlist.to_string(), "1");
///
/// // Distinct types; this does not compile:
/// // let _: WishlistId = ReviewId::new(1);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(CartId);
define_id!(CartItemId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_converts_to_and_from_i32() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(ProductId::from(42), id);
    }

    #[test]
    fn test_id_serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&CartId::new(7)).unwrap(), "7");

        let parsed: CartItemId = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, CartItemId::new(9));
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids = vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)];
        ids.sort();
        assert_eq!(ids, [ProductId::new(1), ProductId::new(2), ProductId::new(3)]);
    }
}
