//! Customer identifiers.
//!
//! IDs are opaque strings. New ones are random UUIDs, but anything made of
//! ASCII alphanumerics, `-` and `_` is accepted so records written by other
//! tools can still be addressed.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing a [`CustomerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdError {
    /// The input string is empty.
    #[error("customer id cannot be empty")]
    Empty,
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("customer id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Identifier of a stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Generate a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an ID supplied by a user or read from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters that
    /// are not safe to use as a storage key.
    pub fn parse(s: &str) -> Result<Self, CustomerIdError> {
        if s.is_empty() {
            return Err(CustomerIdError::Empty);
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(CustomerIdError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CustomerId {
    type Err = CustomerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_parseable_and_distinct() {
        let a = CustomerId::generate();
        let b = CustomerId::generate();
        assert_ne!(a, b);
        assert_eq!(CustomerId::parse(a.as_str()).unwrap(), a);
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert_eq!(CustomerId::parse(""), Err(CustomerIdError::Empty));
        assert_eq!(
            CustomerId::parse("../etc"),
            Err(CustomerIdError::InvalidCharacter('.'))
        );
        assert_eq!(
            CustomerId::parse("a/b"),
            Err(CustomerIdError::InvalidCharacter('/'))
        );
    }
}
