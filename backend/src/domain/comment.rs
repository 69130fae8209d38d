//! Post-rental comments.
//!
//! A comment is a simple write gated by booking history: only a user who has
//! completed an approved booking of the item may comment on it. The gate is
//! the only reason comments live next to the booking core.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;

use super::error::BookingError;
use super::item::ItemId;
use super::ports::{BookingRepository, CommentCommand, CommentRepository, ItemStore, UserStore};
use super::user::UserId;

/// A comment before it has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    /// The commented item.
    pub item: ItemId,
    /// The comment author (a past renter).
    pub author: UserId,
    /// Comment text, non-blank.
    pub text: String,
    /// Creation instant.
    pub created: DateTime<Utc>,
}

/// A persisted comment with the author's display name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: i64,
    item: ItemId,
    author: UserId,
    author_name: String,
    text: String,
    created: DateTime<Utc>,
}

impl Comment {
    /// Reassemble a comment from persisted state.
    #[must_use]
    pub fn new(
        id: i64,
        item: ItemId,
        author: UserId,
        author_name: impl Into<String>,
        text: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            item,
            author,
            author_name: author_name.into(),
            text: text.into(),
            created,
        }
    }

    /// Comment identity.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// The commented item.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    /// The author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// The author's display name.
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author_name.as_str()
    }

    /// Comment text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Creation instant.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Comment creation service enforcing the completed-rental gate.
#[derive(Clone)]
pub struct CommentService<B, I, U, C> {
    bookings: Arc<B>,
    items: Arc<I>,
    users: Arc<U>,
    comments: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<B, I, U, C> CommentService<B, I, U, C> {
    /// Create the service over the given stores and clock.
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
impl<B, I, U, C> CommentCommand for CommentService<B, I, U, C>
where
    B: BookingRepository,
    I: ItemStore,
    U: UserStore,
    C: CommentRepository,
{
    async fn create_comment(
        &self,
        item: ItemId,
        author: UserId,
        text: String,
    ) -> Result<Comment, BookingError> {
        if text.trim().is_empty() {
            return Err(BookingError::BlankComment);
        }
        if !self.users.exists(author).await? {
            return Err(BookingError::UserNotFound(author));
        }
        if self.items.find_by_id(item).await?.is_none() {
            return Err(BookingError::ItemNotFound(item));
        }

        let now = self.clock.utc();
        if !self.bookings.has_completed_booking(author, item, now).await? {
            return Err(BookingError::CommentNotAllowed { user: author, item });
        }

        let comment = self
            .comments
            .insert(&CommentDraft {
                item,
                author,
                text,
                created: now,
            })
            .await?;
        info!(item = %item, author = %author, "comment created");
        Ok(comment)
    }
}

#[cfg(test)]
#[path = "comment_tests.rs"]
mod tests;
