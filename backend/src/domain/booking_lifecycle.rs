//! Booking lifecycle: creation, approval, rejection.
//!
//! Creation admits any number of `WAITING` bookings, overlapping or not;
//! many requests may compete for one slot and only one is admitted. The
//! overlap-safety rule is enforced solely at approval time, inside the
//! repository's atomic [`approve_if_vacant`] write, which serialises
//! approvals per item so the set of `APPROVED` bookings for an item stays
//! pairwise non-overlapping.
//!
//! [`approve_if_vacant`]: super::ports::BookingRepository::approve_if_vacant

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::booking::{Booking, BookingDraft, BookingId};
use super::error::BookingError;
use super::ports::{
    ApprovalOutcome, BookingCommand, BookingLookup, BookingRepository, ItemStore, UserStore,
};
use super::user::UserId;

/// The booking state machine service.
#[derive(Clone)]
pub struct BookingLifecycle<B, I, U> {
    bookings: Arc<B>,
    items: Arc<I>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<B, I, U> BookingLifecycle<B, I, U> {
    /// Create the service over the given stores and clock.
    pub fn new(bookings: Arc<B>, items: Arc<I>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bookings,
            items,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<B, I, U> BookingCommand for BookingLifecycle<B, I, U>
where
    B: BookingRepository,
    I: ItemStore,
    U: UserStore,
{
    async fn create(&self, draft: BookingDraft) -> Result<Booking, BookingError> {
        // The slot type already guarantees end > start; the policy boundary
        // additionally refuses windows starting in the past.
        if draft.slot.start() < self.clock.utc() {
            return Err(BookingError::InvalidRange {
                reason: "start must not be in the past".to_owned(),
            });
        }

        let item = self
            .items
            .find_by_id(draft.item)
            .await?
            .ok_or(BookingError::ItemNotFound(draft.item))?;
        if !item.available() {
            return Err(BookingError::ItemUnavailable(item.id()));
        }
        if item.owner() == draft.booker {
            return Err(BookingError::SelfBooking);
        }
        if !self.users.exists(draft.booker).await? {
            return Err(BookingError::UserNotFound(draft.booker));
        }

        let booking = self.bookings.insert(&draft).await?;
        info!(booking = %booking.id(), item = %item.id(), booker = %draft.booker, "booking created");
        Ok(booking)
    }

    async fn confirm(
        &self,
        booking_id: BookingId,
        acting_user: UserId,
        approve: bool,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        // The booker asking to decide their own booking is answered with a
        // not-found class error; a third party gets a bad-request class one.
        if booking.booker() == acting_user {
            return Err(BookingError::SelfConfirmation(booking_id));
        }
        let item = self
            .items
            .find_by_id(booking.item())
            .await?
            .ok_or(BookingError::ItemNotFound(booking.item()))?;
        if item.owner() != acting_user {
            return Err(BookingError::InvalidActor(acting_user));
        }
        if !booking.is_waiting() {
            return Err(BookingError::AlreadyDecided(booking_id));
        }

        if approve {
            match self.bookings.approve_if_vacant(booking_id).await? {
                ApprovalOutcome::Approved(approved) => {
                    info!(booking = %booking_id, item = %item.id(), "booking approved");
                    Ok(approved)
                }
                // The booking keeps WAITING; the owner may retry another
                // window or reject explicitly.
                ApprovalOutcome::Overlap => Err(BookingError::SlotUnavailable),
                ApprovalOutcome::AlreadyDecided => Err(BookingError::AlreadyDecided(booking_id)),
            }
        } else {
            let rejected = self
                .bookings
                .reject(booking_id)
                .await?
                .ok_or(BookingError::AlreadyDecided(booking_id))?;
            info!(booking = %booking_id, item = %item.id(), "booking rejected");
            Ok(rejected)
        }
    }
}

#[async_trait]
impl<B, I, U> BookingLookup for BookingLifecycle<B, I, U>
where
    B: BookingRepository,
    I: ItemStore,
    U: UserStore,
{
    async fn get_by_id(
        &self,
        booking_id: BookingId,
        requesting_user: UserId,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        if booking.booker() == requesting_user {
            return Ok(booking);
        }
        let item = self
            .items
            .find_by_id(booking.item())
            .await?
            .ok_or(BookingError::ItemNotFound(booking.item()))?;
        if item.owner() == requesting_user {
            return Ok(booking);
        }
        Err(BookingError::NotVisible {
            booking: booking_id,
            user: requesting_user,
        })
    }
}

#[cfg(test)]
#[path = "booking_lifecycle_tests.rs"]
mod tests;
