//! Enriched owner listing: each item with its last/next approved booking.
//!
//! This is a batched read: for a listing of N items it issues one booking
//! aggregation query and one comment query, never N per-item lookups.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::booking::Booking;
use super::comment::Comment;
use super::error::BookingError;
use super::item::Item;
use super::ports::{BookingRepository, CommentRepository, ItemListingQuery, ItemStore, UserStore};
use super::user::UserId;

/// One item of the owner listing, joined with its booking schedule and
/// comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedItem {
    /// The listed item.
    pub item: Item,
    /// The approved booking with `start < now` having the maximum `end`.
    pub last_booking: Option<Booking>,
    /// The approved booking with `start > now` having the minimum `start`.
    pub next_booking: Option<Booking>,
    /// Comments left by past renters, oldest first.
    pub comments: Vec<Comment>,
}

/// Owner aggregation service.
#[derive(Clone)]
pub struct OwnerAggregationView<B, I, U, C> {
    bookings: Arc<B>,
    items: Arc<I>,
    users: Arc<U>,
    comments: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<B, I, U, C> OwnerAggregationView<B, I, U, C> {
    /// Create the view over the given stores and clock.
    pub fn new(
        bookings: Arc<B>,
        items: Arc<I>,
        users: Arc<U>,
        comments: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            items,
            users,
            comments,
            clock,
        }
    }
}

#[async_trait]
impl<B, I, U, C> ItemListingQuery for OwnerAggregationView<B, I, U, C>
where
    B: BookingRepository,
    I: ItemStore,
    U: UserStore,
    C: CommentRepository,
{
    async fn enriched_items(&self, owner: UserId) -> Result<Vec<EnrichedItem>, BookingError> {
        if !self.users.exists(owner).await? {
            return Err(BookingError::UserNotFound(owner));
        }
        let now = self.clock.utc();

        let items = self.items.list_by_owner(owner).await?;
        let mut schedules = self.bookings.last_and_next_for_owner(owner, now).await?;
        let mut comments = self.comments.list_for_owner_items(owner).await?;

        let enriched = items
            .into_iter()
            .map(|item| {
                let schedule = schedules.remove(&item.id()).unwrap_or_default();
                let item_comments = comments.remove(&item.id()).unwrap_or_default();
                EnrichedItem {
                    item,
                    last_booking: schedule.last,
                    next_booking: schedule.next,
                    comments: item_comments,
                }
            })
            .collect::<Vec<_>>();

        info!(owner = %owner, count = enriched.len(), "built enriched item listing");
        Ok(enriched)
    }
}

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod tests;
