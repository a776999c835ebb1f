//! Row identifiers.
//!
//! Every table keys on a `SERIAL` column. Each gets its own newtype so a
//! `ProductId` can't be passed where an `OrderId` is expected; on the wire and
//! in the database they are plain integers.

/// Declare one or more `i32` row id newtypes.
///
/// Each id is `Copy`, serializes as a bare number, displays as one, and
/// converts to and from `i32`. With the `postgres` feature it binds and
/// decodes as `INTEGER`.
///
/// ```rust
/// # use luxe_jewel_core::define_ids;
/// define_ids! {
///     /// A gift registry.
///     RegistryId,
///     /// A line in a registry.
///     RegistryItemId,
/// }
///
/// let registry = RegistryId::new(7);
/// assert!(registry.is_valid());
/// assert_eq!(RegistryItemId::new(0).positive(), None);
///
/// // Distinct types, so this won't compile:
/// // let _: RegistryId = RegistryItemId::new(7);
/// ```
#[macro_export]
macro_rules! define_ids {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }

            /// Serial keys start at 1; zero and negatives never reference a row.
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                self.0 > 0
            }

            /// `Some(self)` if this could reference a row.
            #[must_use]
            pub const fn positive(self) -> Option<Self> {
                if self.is_valid() { Some(self) } else { None }
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
    )+};
}

define_ids! {
    /// A customer or admin account.
    UserId,
    CategoryId,
    ProductId,
    /// A size or metal option of a product. Carried on cart and order lines only.
    VariantId,
    /// A row of the server-side cart.
    CartItemId,
    OrderId,
    /// A purchased line, priced as it was at checkout.
    OrderItemId,
    ReviewId,
    WishlistItemId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_validity() {
        assert!(ProductId::new(1).is_valid());
        assert!(!ProductId::new(0).is_valid());
        assert_eq!(ProductId::new(-3).positive(), None);
        assert_eq!(ProductId::new(9).positive(), Some(ProductId::new(9)));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = OrderId::new(42);
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("42"));
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);

        let parsed: Option<ReviewId> = serde_json::from_str("17").ok();
        assert_eq!(parsed, Some(ReviewId::new(17)));
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids = vec![CartItemId::new(10), CartItemId::new(2), CartItemId::new(7)];
        ids.sort();
        assert_eq!(ids, [CartItemId::new(2), CartItemId::new(7), CartItemId::new(10)]);
    }
}
