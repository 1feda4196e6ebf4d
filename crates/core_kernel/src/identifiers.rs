//! Typed identifiers
//!
//! Each entity id wraps a UUID and serializes as the bare UUID. `Display`
//! adds a short prefix (`TEN-...`, `SQR-...`) for logs and support
//! references, and parsing accepts either form so ids copied out of a log
//! line can be pasted straight into a URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// An identifier string that is neither a UUID nor a prefixed UUID
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind} id: {input}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
}

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Time-ordered, so ids sort by creation instant
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let bare = trimmed
                    .strip_prefix(concat!($prefix, "-"))
                    .unwrap_or(trimmed);
                Uuid::parse_str(bare).map(Self).map_err(|_| IdParseError {
                    kind: $kind,
                    input: s.to_string(),
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

typed_id!(
    /// Carrier or program the caller acts for; scopes every lookup
    TenantId, "TEN", "tenant"
);
typed_id!(ProductId, "PRD", "product");
typed_id!(QuoteId, "QUO", "quote");
typed_id!(
    /// Special quote requests are created with v7 ids
    SpecialQuoteRequestId, "SQR", "special quote request"
);
