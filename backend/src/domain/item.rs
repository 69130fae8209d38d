//! Item view consumed by the booking core.
//!
//! Item CRUD and search are external collaborators. The core reads the
//! `available` flag and the owner reference when admitting a booking, and
//! echoes the descriptive attributes in the enriched owner listing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::user::{ParseIdError, UserId};

/// Opaque numeric item identifier, positive and database-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
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

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse()?;
        if raw <= 0 {
            return Err(ParseIdError::NotPositive(raw));
        }
        Ok(Self(raw))
    }
}

/// Read-only item view. The core never mutates an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    owner: UserId,
    name: String,
    description: String,
    available: bool,
}

impl Item {
    /// Assemble an item view from stored attributes.
    #[must_use]
    pub fn new(
        id: ItemId,
        owner: UserId,
        name: impl Into<String>,
        description: impl Into<String>,
        available: bool,
    ) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            description: description.into(),
            available,
        }
    }

    /// Item identity.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// The user who listed the item; the only actor who may decide bookings.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Whether the owner currently admits new bookings.
    #[must_use]
    pub const fn available(&self) -> bool {
        self.available
    }
}
