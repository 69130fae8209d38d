//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the core expects to talk to storage; each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants. Driving ports are the use-case traits the HTTP
//! adapter depends on, implemented by the services in this module tree.
//!
//! The current instant is injected as `mockable::Clock` so tests can pin
//! `now` deterministically; nothing in the core reads the platform clock
//! directly.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::aggregation::EnrichedItem;
use super::booking::{Booking, BookingDraft, BookingId};
use super::comment::{Comment, CommentDraft};
use super::error::BookingError;
use super::item::{Item, ItemId};
use super::page::Page;
use super::temporal::BookingState;
use super::user::{User, UserId};

/// Persistence errors raised by [`BookingRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingRepositoryError {
    /// Repository connection could not be established.
    #[error("booking repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("booking repository query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl BookingRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`ItemStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemStoreError {
    /// Store connection could not be established.
    #[error("item store connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query failed during execution.
    #[error("item store query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl ItemStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`UserStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`CommentRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentRepositoryError {
    /// Repository connection could not be established.
    #[error("comment repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("comment repository query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl CommentRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<BookingRepositoryError> for BookingError {
    fn from(err: BookingRepositoryError) -> Self {
        match err {
            BookingRepositoryError::Connection { message } => Self::Unavailable { message },
            BookingRepositoryError::Query { message } => Self::Storage { message },
        }
    }
}

impl From<ItemStoreError> for BookingError {
    fn from(err: ItemStoreError) -> Self {
        match err {
            ItemStoreError::Connection { message } => Self::Unavailable { message },
            ItemStoreError::Query { message } => Self::Storage { message },
        }
    }
}

impl From<UserStoreError> for BookingError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Connection { message } => Self::Unavailable { message },
            UserStoreError::Query { message } => Self::Storage { message },
        }
    }
}

impl From<CommentRepositoryError> for BookingError {
    fn from(err: CommentRepositoryError) -> Self {
        match err {
            CommentRepositoryError::Connection { message } => Self::Unavailable { message },
            CommentRepositoryError::Query { message } => Self::Storage { message },
        }
    }
}

/// Result of the atomic approve-if-no-overlap write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// No approved overlap existed; the booking is now `APPROVED`.
    Approved(Booking),
    /// An approved booking intersects the window; the booking stays
    /// `WAITING`.
    Overlap,
    /// The booking left `WAITING` before the write (lost race).
    AlreadyDecided,
}

/// Per-item last/next approved bookings, keyed for the owner listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSchedule {
    /// The approved booking with `start < now` having the maximum `end`.
    pub last: Option<Booking>,
    /// The approved booking with `start > now` having the minimum `start`.
    pub next: Option<Booking>,
}

/// Persistence port for bookings.
///
/// Listing queries take `now` as an argument rather than reading a clock so
/// one instant is used consistently across a request.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking in the `WAITING` state, returning it with its
    /// assigned id.
    async fn insert(&self, draft: &BookingDraft) -> Result<Booking, BookingRepositoryError>;

    /// Fetch a booking by id.
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Flip a `WAITING` booking to `REJECTED`. Returns `None` when the
    /// booking no longer waits (decided concurrently or missing).
    async fn reject(&self, id: BookingId) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Atomically re-check the approved-overlap condition and flip a
    /// `WAITING` booking to `APPROVED`.
    ///
    /// Implementations must serialise this write per item so that for any
    /// item the set of `APPROVED` bookings stays pairwise non-overlapping,
    /// even under concurrent calls.
    async fn approve_if_vacant(
        &self,
        id: BookingId,
    ) -> Result<ApprovalOutcome, BookingRepositoryError>;

    /// Bookings made by `booker`, filtered by `state` against `now`, ordered
    /// descending by start.
    async fn list_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings of every item owned by `owner`, filtered by `state` against
    /// `now`, ordered descending by start.
    async fn list_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Batched last/next approved booking for every item of `owner`. Items
    /// without approved bookings are absent from the map.
    async fn last_and_next_for_owner(
        &self,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<HashMap<ItemId, ItemSchedule>, BookingRepositoryError>;

    /// Whether `booker` has an `APPROVED` booking of `item` that ended
    /// before `now` (the comment gate).
    async fn has_completed_booking(
        &self,
        booker: UserId,
        item: ItemId,
        now: DateTime<Utc>,
    ) -> Result<bool, BookingRepositoryError>;
}

/// Read-only port over the item catalogue.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch an item by id.
    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError>;

    /// Every item listed by `owner`, ordered by id.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Item>, ItemStoreError>;
}

/// Read-only port over user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError>;

    /// Whether a user id resolves.
    async fn exists(&self, id: UserId) -> Result<bool, UserStoreError>;
}

/// Persistence port for post-rental comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a comment, returning it with its assigned id and the author's
    /// display name resolved.
    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, CommentRepositoryError>;

    /// Comments on one item, oldest first.
    async fn list_for_item(&self, item: ItemId) -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Batched comments for every item of `owner`, keyed by item.
    async fn list_for_owner_items(
        &self,
        owner: UserId,
    ) -> Result<HashMap<ItemId, Vec<Comment>>, CommentRepositoryError>;
}

/// Driving port for booking mutations.
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Create a `WAITING` booking (no overlap check at creation).
    async fn create(&self, draft: BookingDraft) -> Result<Booking, BookingError>;

    /// Approve or reject a `WAITING` booking as the item owner.
    async fn confirm(
        &self,
        booking: BookingId,
        acting_user: UserId,
        approve: bool,
    ) -> Result<Booking, BookingError>;
}

/// Driving port for fetching a single booking.
#[async_trait]
pub trait BookingLookup: Send + Sync {
    /// Fetch a booking, visible only to its booker or the item owner.
    async fn get_by_id(
        &self,
        booking: BookingId,
        requesting_user: UserId,
    ) -> Result<Booking, BookingError>;
}

/// Driving port for the temporal listing queries.
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Bookings made by `booker`, classified by `state`.
    async fn list_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        page: Page,
    ) -> Result<Vec<Booking>, BookingError>;

    /// Bookings of every item owned by `owner`, classified by `state`.
    async fn list_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        page: Page,
    ) -> Result<Vec<Booking>, BookingError>;
}

/// Driving port for the owner's enriched item listing.
#[async_trait]
pub trait ItemListingQuery: Send + Sync {
    /// Items of `owner` with last/next approved bookings and comments.
    async fn enriched_items(&self, owner: UserId) -> Result<Vec<EnrichedItem>, BookingError>;
}

/// Driving port for post-rental comments.
#[async_trait]
pub trait CommentCommand: Send + Sync {
    /// Create a comment on `item` authored by `author`.
    async fn create_comment(
        &self,
        item: ItemId,
        author: UserId,
        text: String,
    ) -> Result<Comment, BookingError>;
}
