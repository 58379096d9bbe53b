//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs here are opaque
//! strings: product ids come from the catalog/search index, quote ids are
//! generated locally, and user ids are issued by the hosted identity
//! provider.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use renewly_core::define_id;
/// define_id!(ProductId);
/// define_id!(QuoteId);
///
/// let product_id = ProductId::new("p1");
/// let quote_id = QuoteId::new("Q-AB12CD");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = quote_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(QuoteId);
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrip() {
        let id = ProductId::new("p1");
        assert_eq!(id.to_string(), "p1");
        assert_eq!(id.as_str(), "p1");
    }

    #[test]
    fn test_serde_transparent() {
        let id = QuoteId::new("Q-AB12CD");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Q-AB12CD\"");
        let parsed: QuoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_from_conversions() {
        let a: UserId = "u-1".into();
        let b = UserId::from("u-1".to_string());
        assert_eq!(a, b);
        let s: String = a.into();
        assert_eq!(s, "u-1");
    }
}
