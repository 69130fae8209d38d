//! Temporal classification of bookings for listing queries.
//!
//! A listing request names a subject (booker or owner) and a state keyword;
//! the classifier resolves the keyword against an injected `now` and returns
//! the matching bookings, always ordered descending by start. The keyword is
//! a closed enumeration: anything outside the six known tags is rejected at
//! the boundary rather than deep in query logic.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use thiserror::Error;
use tracing::info;

use super::booking::Booking;
use super::error::BookingError;
use super::page::Page;
use super::ports::{BookingQuery, BookingRepository, UserStore};
use super::user::UserId;

/// The six listing keywords.
///
/// `Past`, `Future`, and `Current` classify by time alone and partition every
/// booking set for a fixed `now`; `Waiting` and `Rejected` classify by status
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingState {
    /// Every booking of the subject.
    All,
    /// `start < now && end > now`, regardless of status.
    Current,
    /// `end < now`, regardless of status.
    Past,
    /// `start > now`, regardless of status.
    Future,
    /// Status `WAITING`, ignoring time.
    Waiting,
    /// Status `REJECTED`, ignoring time.
    Rejected,
}

/// Error raised for a keyword outside the six known tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown state: {0}")]
pub struct ParseBookingStateError(pub String);

impl FromStr for BookingState {
    type Err = ParseBookingStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "PAST" => Ok(Self::Past),
            "FUTURE" => Ok(Self::Future),
            "WAITING" => Ok(Self::Waiting),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(ParseBookingStateError(s.to_owned())),
        }
    }
}

impl From<ParseBookingStateError> for BookingError {
    fn from(err: ParseBookingStateError) -> Self {
        Self::UnsupportedState(err.0)
    }
}

/// Listing service resolving state keywords against the injected clock.
#[derive(Clone)]
pub struct TemporalClassifier<B, U> {
    bookings: Arc<B>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<B, U> TemporalClassifier<B, U> {
    /// Create a classifier over the given repositories and clock.
    pub fn new(bookings: Arc<B>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bookings,
            users,
            clock,
        }
    }
}

impl<B, U> TemporalClassifier<B, U>
where
    B: BookingRepository,
    U: UserStore,
{
    async fn require_user(&self, user: UserId) -> Result<(), BookingError> {
        if self.users.exists(user).await? {
            Ok(())
        } else {
            Err(BookingError::UserNotFound(user))
        }
    }
}

#[async_trait]
impl<B, U> BookingQuery for TemporalClassifier<B, U>
where
    B: BookingRepository,
    U: UserStore,
{
    async fn list_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        page: Page,
    ) -> Result<Vec<Booking>, BookingError> {
        self.require_user(booker).await?;
        let now = self.clock.utc();
        let bookings = self
            .bookings
            .list_for_booker(booker, state, now, page)
            .await?;
        info!(booker = %booker, state = ?state, count = bookings.len(), "listed bookings for booker");
        Ok(bookings)
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        page: Page,
    ) -> Result<Vec<Booking>, BookingError> {
        self.require_user(owner).await?;
        let now = self.clock.utc();
        let bookings = self.bookings.list_for_owner(owner, state, now, page).await?;
        info!(owner = %owner, state = ?state, count = bookings.len(), "listed bookings for owner");
        Ok(bookings)
    }
}

#[cfg(test)]
#[path = "temporal_tests.rs"]
mod tests;
