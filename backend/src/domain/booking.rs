//! Booking aggregate: a reservation of an item for a half-open time window.
//!
//! ## Invariants
//! - `end` is strictly after `start` ([`TimeSlot`] enforces this).
//! - `booker` and `item` are immutable after creation.
//! - `status` starts at [`BookingStatus::Waiting`] and transitions at most
//!   once, to either `Approved` or `Rejected`; both are terminal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::ItemId;
use super::user::{ParseIdError, UserId};

/// Opaque numeric booking identifier, positive and database-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(i64);

impl BookingId {
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

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse()?;
        if raw <= 0 {
            return Err(ParseIdError::NotPositive(raw));
        }
        Ok(Self(raw))
    }
}

/// The three booking states; `Waiting` is initial, the other two terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Created, awaiting the owner's decision.
    Waiting,
    /// Admitted by the owner; occupies its slot exclusively.
    Approved,
    /// Declined by the owner.
    Rejected,
}

impl BookingStatus {
    /// Textual enum name as persisted in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when decoding an unknown status name from storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking status: {0}")]
pub struct ParseBookingStatusError(pub String);

impl FromStr for BookingStatus {
    type Err = ParseBookingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(Self::Waiting),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(ParseBookingStatusError(other.to_owned())),
        }
    }
}

/// Validation errors raised by [`TimeSlot::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeSlotValidationError {
    /// The window is empty or inverted.
    #[error("booking end must be strictly after its start")]
    EndNotAfterStart,
}

/// Half-open time window `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSlot {
    /// Construct a slot, rejecting empty or inverted windows.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeSlotValidationError> {
        if end <= start {
            return Err(TimeSlotValidationError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Window start (inclusive).
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end (exclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open interval intersection: `a.start < b.end && a.end > b.start`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// The window ended before `now`.
    #[must_use]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }

    /// The window starts after `now`.
    #[must_use]
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }

    /// `now` falls inside the window.
    #[must_use]
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.start < now && self.end > now
    }
}

/// A reservation request before it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Requested time window.
    pub slot: TimeSlot,
    /// The item being reserved.
    pub item: ItemId,
    /// The requesting user.
    pub booker: UserId,
}

/// A persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    id: BookingId,
    slot: TimeSlot,
    item: ItemId,
    booker: UserId,
    status: BookingStatus,
}

impl Booking {
    /// Reassemble a booking from persisted state.
    #[must_use]
    pub const fn new(
        id: BookingId,
        slot: TimeSlot,
        item: ItemId,
        booker: UserId,
        status: BookingStatus,
    ) -> Self {
        Self {
            id,
            slot,
            item,
            booker,
            status,
        }
    }

    /// Booking identity, assigned at creation.
    #[must_use]
    pub const fn id(&self) -> BookingId {
        self.id
    }

    /// The reserved time window.
    #[must_use]
    pub const fn slot(&self) -> TimeSlot {
        self.slot
    }

    /// The reserved item; immutable after creation.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    /// The requesting user; immutable after creation.
    #[must_use]
    pub const fn booker(&self) -> UserId {
        self.booker
    }

    /// Current state in the `WAITING -> {APPROVED, REJECTED}` machine.
    #[must_use]
    pub const fn status(&self) -> BookingStatus {
        self.status
    }

    /// Whether the booking is still awaiting a decision.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.status == BookingStatus::Waiting
    }
}
