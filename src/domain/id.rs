//! Validated, prefixed entity identifiers
//!
//! Every entity carries an ID of the form `{prefix}{uuid}` (for example
//! `run-1c4e...`). IDs are validated on construction and deserialization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::error::DomainError;

/// Regex for the UUID tail of an entity ID
static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Validate an ID string against its expected prefix
pub(crate) fn validate_prefixed_id(id: &str, prefix: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::invalid_id("ID cannot be empty"));
    }

    let Some(tail) = id.strip_prefix(prefix) else {
        return Err(DomainError::invalid_id(format!(
            "Invalid ID '{}': must be in format {}{{uuid}}",
            id, prefix
        )));
    };

    if !UUID_PATTERN.is_match(tail) {
        return Err(DomainError::invalid_id(format!(
            "Invalid ID '{}': must be in format {}{{uuid}}",
            id, prefix
        )));
    }

    Ok(())
}

/// Declare a validated ID newtype with the given prefix.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new validated ID
            pub fn new(id: impl Into<String>) -> Result<Self, $crate::domain::error::DomainError> {
                let id = id.into();
                $crate::domain::id::validate_prefixed_id(&id, $prefix)?;
                Ok(Self(id))
            }

            /// Generate a fresh ID with a random UUID
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "{}"), uuid::Uuid::new_v4()))
            }

            /// Get the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::error::DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use entity_id;
