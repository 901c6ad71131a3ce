//! Newtype identifiers.
//!
//! The original implementation passes bare strings for every identifier
//! (`orderID`, `recipientID`, `PVZID`), which means a misordered call site can
//! silently swap one for another. Rust lets us make that a compile error
//! instead, in the spirit of the teacher crate's `Symbol(pub u32)` newtype.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a string-like value as this identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(OrderId, "Identifier of a parcel order, unique within the service.");
string_id!(PvzId, "Identifier of a pickup point (PVZ) a service instance is bound to.");
string_id!(RecipientId, "Identifier of the recipient a parcel is addressed to.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_inner_string() {
        let id = OrderId::from("ord-1");
        assert_eq!(id.to_string(), "ord-1");
        assert_eq!(id.as_str(), "ord-1");
    }

    #[test]
    fn distinct_newtypes_do_not_compare() {
        let order = OrderId::from("same");
        let pvz = PvzId::from("same");
        assert_eq!(order.as_str(), pvz.as_str());
    }
}
