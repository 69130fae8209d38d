//! Shared test doubles: in-memory stores and a pinnable clock.
//!
//! The in-memory booking repository honours the same atomicity contract as
//! the PostgreSQL adapter: `approve_if_vacant` runs its re-check and status
//! flip under one lock, so concurrent approvals of overlapping bookings
//! admit at most one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    ApprovalOutcome, BookingRepository, BookingRepositoryError, CommentRepository,
    CommentRepositoryError, ItemSchedule, ItemStore, ItemStoreError, UserStore, UserStoreError,
};
use crate::domain::{
    Booking, BookingDraft, BookingId, BookingState, BookingStatus, Comment, CommentDraft, Item,
    ItemId, Page, TimeSlot, User, UserId,
};

/// A clock pinned to a fixed instant.
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    pub fn pinned(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
        Arc::new(Self { utc_now })
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Baseline "now" for fixtures; scenario times hang off this instant.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// `fixture_now` shifted by whole hours.
pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    fixture_now() + chrono::Duration::hours(hours)
}

/// Slot spanning `[hours_from_now(from), hours_from_now(to))`.
pub fn slot(from: i64, to: i64) -> TimeSlot {
    TimeSlot::new(hours_from_now(from), hours_from_now(to)).expect("valid fixture slot")
}

fn lock<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().expect("test store mutex poisoned")
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Arc<Self> {
        let store = Self::default();
        {
            let mut guard = lock(&store.users);
            for user in users {
                guard.insert(user.id(), user);
            }
        }
        Arc::new(store)
    }

    pub fn name_of(&self, id: UserId) -> Option<String> {
        lock(&self.users).get(&id).map(|u| u.name().to_owned())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn exists(&self, id: UserId) -> Result<bool, UserStoreError> {
        Ok(lock(&self.users).contains_key(&id))
    }
}

#[derive(Default)]
pub struct InMemoryItemStore {
    items: Mutex<HashMap<ItemId, Item>>,
}

impl InMemoryItemStore {
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Arc<Self> {
        let store = Self::default();
        {
            let mut guard = lock(&store.items);
            for item in items {
                guard.insert(item.id(), item);
            }
        }
        Arc::new(store)
    }

    pub fn owner_of(&self, id: ItemId) -> Option<UserId> {
        lock(&self.items).get(&id).map(Item::owner)
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError> {
        Ok(lock(&self.items).get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Item>, ItemStoreError> {
        let mut items: Vec<Item> = lock(&self.items)
            .values()
            .filter(|item| item.owner() == owner)
            .cloned()
            .collect();
        items.sort_by_key(Item::id);
        Ok(items)
    }
}

pub struct InMemoryBookingRepository {
    items: Arc<InMemoryItemStore>,
    bookings: Mutex<HashMap<BookingId, Booking>>,
    next_id: AtomicI64,
}

impl InMemoryBookingRepository {
    pub fn new(items: Arc<InMemoryItemStore>) -> Arc<Self> {
        Arc::new(Self {
            items,
            bookings: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        })
    }

    /// Seed a booking in an arbitrary state, bypassing lifecycle checks.
    pub fn seed(&self, slot: TimeSlot, item: ItemId, booker: UserId, status: BookingStatus) -> Booking {
        let id = BookingId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let booking = Booking::new(id, slot, item, booker, status);
        lock(&self.bookings).insert(id, booking.clone());
        booking
    }

    pub fn status_of(&self, id: BookingId) -> Option<BookingStatus> {
        lock(&self.bookings).get(&id).map(Booking::status)
    }

    fn matches(booking: &Booking, state: BookingState, now: DateTime<Utc>) -> bool {
        match state {
            BookingState::All => true,
            BookingState::Past => booking.slot().is_past(now),
            BookingState::Future => booking.slot().is_future(now),
            BookingState::Current => booking.slot().is_current(now),
            BookingState::Waiting => booking.status() == BookingStatus::Waiting,
            BookingState::Rejected => booking.status() == BookingStatus::Rejected,
        }
    }

    fn page_of(mut selected: Vec<Booking>, page: Page) -> Vec<Booking> {
        selected.sort_by(|a, b| b.slot().start().cmp(&a.slot().start()));
        selected
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(0))
            .take(usize::try_from(page.limit()).unwrap_or(0))
            .collect()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, draft: &BookingDraft) -> Result<Booking, BookingRepositoryError> {
        let id = BookingId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let booking = Booking::new(id, draft.slot, draft.item, draft.booker, BookingStatus::Waiting);
        lock(&self.bookings).insert(id, booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(lock(&self.bookings).get(&id).cloned())
    }

    async fn reject(&self, id: BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut guard = lock(&self.bookings);
        let Some(booking) = guard.get(&id) else {
            return Ok(None);
        };
        if !booking.is_waiting() {
            return Ok(None);
        }
        let rejected = Booking::new(
            booking.id(),
            booking.slot(),
            booking.item(),
            booking.booker(),
            BookingStatus::Rejected,
        );
        guard.insert(id, rejected.clone());
        Ok(Some(rejected))
    }

    async fn approve_if_vacant(
        &self,
        id: BookingId,
    ) -> Result<ApprovalOutcome, BookingRepositoryError> {
        // Check and flip under one lock, mirroring the item-row lock the
        // PostgreSQL adapter takes.
        let mut guard = lock(&self.bookings);
        let Some(booking) = guard.get(&id).cloned() else {
            return Err(BookingRepositoryError::query(format!(
                "booking {id} vanished before approval"
            )));
        };
        if !booking.is_waiting() {
            return Ok(ApprovalOutcome::AlreadyDecided);
        }
        let overlap = guard.values().any(|existing| {
            existing.item() == booking.item()
                && existing.status() == BookingStatus::Approved
                && existing.slot().overlaps(&booking.slot())
        });
        if overlap {
            return Ok(ApprovalOutcome::Overlap);
        }
        let approved = Booking::new(
            booking.id(),
            booking.slot(),
            booking.item(),
            booking.booker(),
            BookingStatus::Approved,
        );
        guard.insert(id, approved.clone());
        Ok(ApprovalOutcome::Approved(approved))
    }

    async fn list_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let selected = lock(&self.bookings)
            .values()
            .filter(|b| b.booker() == booker && Self::matches(b, state, now))
            .cloned()
            .collect();
        Ok(Self::page_of(selected, page))
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let selected = lock(&self.bookings)
            .values()
            .filter(|b| {
                self.items.owner_of(b.item()) == Some(owner) && Self::matches(b, state, now)
            })
            .cloned()
            .collect();
        Ok(Self::page_of(selected, page))
    }

    async fn last_and_next_for_owner(
        &self,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<HashMap<ItemId, ItemSchedule>, BookingRepositoryError> {
        let mut schedules: HashMap<ItemId, ItemSchedule> = HashMap::new();
        for booking in lock(&self.bookings).values() {
            if booking.status() != BookingStatus::Approved
                || self.items.owner_of(booking.item()) != Some(owner)
            {
                continue;
            }
            let schedule = schedules.entry(booking.item()).or_default();
            if booking.slot().start() < now {
                let is_later = schedule
                    .last
                    .as_ref()
                    .is_none_or(|last| booking.slot().end() > last.slot().end());
                if is_later {
                    schedule.last = Some(booking.clone());
                }
            } else if booking.slot().start() > now {
                let is_sooner = schedule
                    .next
                    .as_ref()
                    .is_none_or(|next| booking.slot().start() < next.slot().start());
                if is_sooner {
                    schedule.next = Some(booking.clone());
                }
            }
        }
        schedules.retain(|_, s| s.last.is_some() || s.next.is_some());
        Ok(schedules)
    }

    async fn has_completed_booking(
        &self,
        booker: UserId,
        item: ItemId,
        now: DateTime<Utc>,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(lock(&self.bookings).values().any(|b| {
            b.booker() == booker
                && b.item() == item
                && b.status() == BookingStatus::Approved
                && b.slot().end() < now
        }))
    }
}

pub struct InMemoryCommentRepository {
    users: Arc<InMemoryUserStore>,
    items: Arc<InMemoryItemStore>,
    comments: Mutex<Vec<Comment>>,
    next_id: AtomicI64,
}

impl InMemoryCommentRepository {
    pub fn new(users: Arc<InMemoryUserStore>, items: Arc<InMemoryItemStore>) -> Arc<Self> {
        Arc::new(Self {
            users,
            items,
            comments: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        })
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, CommentRepositoryError> {
        let author_name = self
            .users
            .name_of(draft.author)
            .ok_or_else(|| CommentRepositoryError::query("unknown comment author"))?;
        let comment = Comment::new(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            draft.item,
            draft.author,
            author_name,
            draft.text.clone(),
            draft.created,
        );
        lock(&self.comments).push(comment.clone());
        Ok(comment)
    }

    async fn list_for_item(&self, item: ItemId) -> Result<Vec<Comment>, CommentRepositoryError> {
        Ok(lock(&self.comments)
            .iter()
            .filter(|c| c.item() == item)
            .cloned()
            .collect())
    }

    async fn list_for_owner_items(
        &self,
        owner: UserId,
    ) -> Result<HashMap<ItemId, Vec<Comment>>, CommentRepositoryError> {
        let mut by_item: HashMap<ItemId, Vec<Comment>> = HashMap::new();
        for comment in lock(&self.comments).iter() {
            if self.items.owner_of(comment.item()) == Some(owner) {
                by_item.entry(comment.item()).or_default().push(comment.clone());
            }
        }
        Ok(by_item)
    }
}
