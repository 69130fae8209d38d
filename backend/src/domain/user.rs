//! User identity consumed by the booking core.
//!
//! User accounts are managed elsewhere; the core only reads identities for
//! authorisation comparisons and display names for comment payloads.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque numeric user identifier, positive and database-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised when parsing an identifier from the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    /// The value is not an integer.
    #[error("identifier is not an integer: {0}")]
    NotNumeric(#[from] ParseIntError),
    /// Identifiers are assigned from a positive sequence.
    #[error("identifier must be positive, got {0}")]
    NotPositive(i64),
}

impl FromStr for UserId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse()?;
        if raw <= 0 {
            return Err(ParseIdError::NotPositive(raw));
        }
        Ok(Self(raw))
    }
}

/// Read-only user view: identity plus the attributes echoed in responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
}

impl User {
    /// Assemble a user view from stored attributes.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// User identity.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact address; unique across the platform, enforced elsewhere.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
