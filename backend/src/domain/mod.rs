//! Domain entities, ports, and the booking core services.
//!
//! The three services with real invariants live here:
//! [`BookingLifecycle`] (creation and approval state machine),
//! [`TemporalClassifier`] (time/status listing queries), and
//! [`OwnerAggregationView`] (per-item last/next approved booking). Comments
//! ride along because their write gate is derived from booking history.

pub mod aggregation;
pub mod booking;
pub mod booking_lifecycle;
pub mod comment;
pub mod error;
pub mod item;
pub mod page;
pub mod ports;
pub mod temporal;
pub mod user;

pub use self::aggregation::{EnrichedItem, OwnerAggregationView};
pub use self::booking::{
    Booking, BookingDraft, BookingId, BookingStatus, TimeSlot, TimeSlotValidationError,
};
pub use self::booking_lifecycle::BookingLifecycle;
pub use self::comment::{Comment, CommentDraft, CommentService};
pub use self::error::{BookingError, Error, ErrorCode};
pub use self::item::{Item, ItemId};
pub use self::page::{Page, PageValidationError};
pub use self::temporal::{BookingState, ParseBookingStateError, TemporalClassifier};
pub use self::user::{User, UserId};
