//! Newtype IDs for type-safe entity references.
//!
//! The remote API identifies every record with an opaque object id string.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing a category id where a product id is expected.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use fresh_cart_core::define_id;
/// define_id!(ReviewId);
/// define_id!(CouponId);
///
/// let review = ReviewId::new("6428ebc6dc1175abc65ca0b9");
/// let coupon = CouponId::new("6428ebc6dc1175abc65ca0b9");
///
/// // These are different types, so this won't compile:
/// // let _: ReviewId = coupon;
/// assert_eq!(review.as_str(), coupon.as_str());
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
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the id string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(SubcategoryId);
define_id!(BrandId);
define_id!(CartId);
define_id!(CartItemId);
define_id!(UserId);
define_id!(OrderId);

/// Human-facing order number shown as `#1234` in order history.
///
/// The remote API keeps a separate object id for orders ([`OrderId`]);
/// this is the sequential number customers quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(u64);

impl OrderNumber {
    /// Create a new order number.
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Get the underlying number.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for OrderNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrips_through_json_as_plain_string() {
        let id = ProductId::new("6428ead5dc1175abc65ca0ad");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"6428ead5dc1175abc65ca0ad\"");
    }

    #[test]
    fn test_id_display_is_raw_value() {
        let id = CategoryId::from("6439d58a0049ad0b52b9003f");
        assert_eq!(id.to_string(), "6439d58a0049ad0b52b9003f");
    }

    #[test]
    fn test_order_number_display_has_hash_prefix() {
        assert_eq!(OrderNumber::new(71_245).to_string(), "#71245");
    }
}
