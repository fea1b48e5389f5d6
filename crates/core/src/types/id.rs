//! Typed IDs for storefront API entities.
//!
//! The storefront REST API identifies categories, products, collections,
//! variant groups, addresses, cities and countries by integer IDs. Each
//! gets its own newtype so a `CityId` can never be passed where a
//! `CountryId` is expected, while the JSON stays a bare number.

/// Define an ID newtype over the API's `i64` identifiers.
///
/// The type serializes as a plain JSON number, displays as the number (as
/// used in REST paths like `addresses/{id}`), and converts to and from
/// `i64`.
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(ShelfId);
/// define_id!(AisleId);
///
/// let shelf = ShelfId::new(1);
/// assert_eq!(format!("shelves/{shelf}"), "shelves/1");
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = AisleId::new(1);
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
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Catalog and account entity IDs returned by the storefront API
define_id!(CategoryId);
define_id!(ProductId);
define_id!(CollectionId);
define_id!(VariantGroupId);
define_id!(AddressId);
define_id!(CityId);
define_id!(CountryId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = CategoryId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.as_i64(), 7);
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = AddressId::from(9);
        assert_eq!(id.to_string(), "9");
        assert_eq!(i64::from(id), 9);
    }
}
