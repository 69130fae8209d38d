//! Domain-level error types.
//!
//! [`BookingError`] is the precise, internal failure taxonomy raised by the
//! booking core. [`Error`] is the transport-agnostic payload adapters send to
//! clients; the [`From`] conversion between the two is where two failures are
//! deliberately disguised as "not found" (self-booking and
//! approval-time overlap), preserving the externally observable behaviour of
//! the reference system while keeping distinct variants for diagnostics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::debug;

use super::booking::BookingId;
use super::item::ItemId;
use super::user::UserId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested resource does not exist or is not visible.
    NotFound,
    /// A required backing service is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Error payload returned to adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error payload.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Failures raised by the booking core services.
///
/// Each variant names the precise condition so logs stay diagnosable even
/// where the boundary mapping collapses several variants into one status.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BookingError {
    /// Booking id does not resolve.
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
    /// Item id does not resolve.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    /// User id does not resolve (booker, owner, or comment author).
    #[error("user {0} not found")]
    UserNotFound(UserId),
    /// The requester is neither the booker nor the item owner.
    #[error("booking {booking} is not visible to user {user}")]
    NotVisible {
        /// The booking the requester asked for.
        booking: BookingId,
        /// The requester.
        user: UserId,
    },
    /// `end <= start` or `start` already in the past.
    #[error("invalid booking range: {reason}")]
    InvalidRange {
        /// Which temporal constraint failed.
        reason: String,
    },
    /// The item exists but is flagged unavailable by its owner.
    #[error("item {0} is not available for booking")]
    ItemUnavailable(ItemId),
    /// Booker equals item owner.
    #[error("an item cannot be booked by its own owner")]
    SelfBooking,
    /// The booker attempted to decide their own booking.
    #[error("a booking must be decided by the item owner, not the booker")]
    SelfConfirmation(BookingId),
    /// Someone other than the item owner attempted to decide a booking.
    #[error("user {0} is not the owner of the booked item")]
    InvalidActor(UserId),
    /// Confirm attempted on a booking that already left `WAITING`.
    #[error("booking {0} has already been decided")]
    AlreadyDecided(BookingId),
    /// An approved booking already intersects the requested window.
    #[error("an approved booking already occupies this time window")]
    SlotUnavailable,
    /// Unknown `state` keyword in a listing query.
    #[error("Unknown state: {0}")]
    UnsupportedState(String),
    /// Comment author has no completed approved booking of the item.
    #[error("user {user} has not completed a rental of item {item}")]
    CommentNotAllowed {
        /// The would-be author.
        user: UserId,
        /// The commented item.
        item: ItemId,
    },
    /// Comment text is empty or whitespace.
    #[error("comment text must not be blank")]
    BlankComment,
    /// A backing store is unreachable.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied description.
        message: String,
    },
    /// A backing store failed while executing a query.
    #[error("storage failure: {message}")]
    Storage {
        /// Adapter-supplied description.
        message: String,
    },
}

impl From<BookingError> for Error {
    fn from(err: BookingError) -> Self {
        debug!(error = %err, "mapping booking error to response payload");
        let message = err.to_string();
        match err {
            BookingError::BookingNotFound(_)
            | BookingError::ItemNotFound(_)
            | BookingError::UserNotFound(_)
            | BookingError::NotVisible { .. } => Self::not_found(message),
            // Intentionally disguised as not-found: the reference behaviour
            // does not reveal why the slot or item was refused.
            BookingError::SelfBooking
            | BookingError::SelfConfirmation(_)
            | BookingError::SlotUnavailable => Self::not_found(message),
            BookingError::InvalidRange { .. }
            | BookingError::ItemUnavailable(_)
            | BookingError::InvalidActor(_)
            | BookingError::AlreadyDecided(_)
            | BookingError::UnsupportedState(_)
            | BookingError::CommentNotAllowed { .. }
            | BookingError::BlankComment => Self::invalid_request(message),
            BookingError::Unavailable { .. } => Self::service_unavailable(message),
            BookingError::Storage { .. } => Self::internal(message),
        }
    }
}
