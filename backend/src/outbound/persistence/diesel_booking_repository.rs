//! Diesel-backed implementation of the booking persistence port.
//!
//! The approval write runs inside one transaction that locks the item row
//! with `SELECT ... FOR UPDATE`, so concurrent approvals for the same item
//! serialise and the approved set stays pairwise non-overlapping.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    ApprovalOutcome, BookingRepository, BookingRepositoryError, ItemSchedule,
};
use crate::domain::{
    Booking, BookingDraft, BookingId, BookingState, BookingStatus, ItemId, Page, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BookingRow, NewBookingRow};
use super::pool::DbPool;
use super::schema::{bookings, items};

/// Booking repository over a PostgreSQL pool.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a repository backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        BookingRepositoryError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))
    }
}

fn map_query_error(error: diesel::result::Error) -> BookingRepositoryError {
    map_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

fn decode(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    Booking::try_from(row).map_err(|err| BookingRepositoryError::query(err.to_string()))
}

/// First row per item wins; rows must arrive ordered by the winning sort key.
fn fold_first_per_item(
    schedules: &mut HashMap<ItemId, ItemSchedule>,
    rows: Vec<BookingRow>,
    pick: impl Fn(&mut ItemSchedule) -> &mut Option<Booking>,
) -> Result<(), BookingRepositoryError> {
    for row in rows {
        let item = ItemId::new(row.item_id);
        let slot = pick(schedules.entry(item).or_default());
        if slot.is_none() {
            *slot = Some(decode(row)?);
        }
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, draft: &BookingDraft) -> Result<Booking, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        let new_row = NewBookingRow {
            start_date: draft.slot.start(),
            end_date: draft.slot.end(),
            item_id: draft.item.get(),
            booker_id: draft.booker.get(),
            status: BookingStatus::Waiting.as_str(),
        };

        let row: BookingRow = diesel::insert_into(bookings::table)
            .values(&new_row)
            .returning(BookingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        decode(row)
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        let row: Option<BookingRow> = bookings::table
            .find(id.get())
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        row.map(decode).transpose()
    }

    async fn reject(&self, id: BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        // Conditional update: touching only WAITING rows makes the lost race
        // visible as an empty result instead of a silent double write.
        let row: Option<BookingRow> = diesel::update(
            bookings::table
                .filter(bookings::id.eq(id.get()))
                .filter(bookings::status.eq(BookingStatus::Waiting.as_str())),
        )
        .set(bookings::status.eq(BookingStatus::Rejected.as_str()))
        .returning(BookingRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_query_error)?;

        row.map(decode).transpose()
    }

    async fn approve_if_vacant(
        &self,
        id: BookingId,
    ) -> Result<ApprovalOutcome, BookingRepositoryError> {
        enum TxOutcome {
            Approved(BookingRow),
            Overlap,
            AlreadyDecided,
            Missing,
        }

        let mut conn = self.conn().await?;

        let outcome = conn
            .transaction::<TxOutcome, diesel::result::Error, _>(|conn| {
                async move {
                    let Some(row) = bookings::table
                        .find(id.get())
                        .select(BookingRow::as_select())
                        .first::<BookingRow>(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(TxOutcome::Missing);
                    };

                    if row.status != BookingStatus::Waiting.as_str() {
                        return Ok(TxOutcome::AlreadyDecided);
                    }

                    // Serialise approvals per item: competing transactions
                    // queue on the item row until this one commits.
                    let _item: i64 = items::table
                        .find(row.item_id)
                        .select(items::id)
                        .for_update()
                        .first(conn)
                        .await?;

                    let conflicts: i64 = bookings::table
                        .filter(bookings::id.ne(row.id))
                        .filter(bookings::item_id.eq(row.item_id))
                        .filter(bookings::status.eq(BookingStatus::Approved.as_str()))
                        .filter(bookings::start_date.lt(row.end_date))
                        .filter(bookings::end_date.gt(row.start_date))
                        .count()
                        .get_result(conn)
                        .await?;

                    if conflicts > 0 {
                        return Ok(TxOutcome::Overlap);
                    }

                    // The snapshot read above predates the item lock, so a
                    // rejection can commit in between. Re-checking WAITING in
                    // the update keeps decided rows terminal.
                    let approved: Option<BookingRow> = diesel::update(
                        bookings::table
                            .filter(bookings::id.eq(row.id))
                            .filter(bookings::status.eq(BookingStatus::Waiting.as_str())),
                    )
                    .set(bookings::status.eq(BookingStatus::Approved.as_str()))
                    .returning(BookingRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    Ok(approved.map_or(TxOutcome::AlreadyDecided, TxOutcome::Approved))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_query_error)?;

        match outcome {
            TxOutcome::Approved(row) => Ok(ApprovalOutcome::Approved(decode(row)?)),
            TxOutcome::Overlap => Ok(ApprovalOutcome::Overlap),
            TxOutcome::AlreadyDecided => Ok(ApprovalOutcome::AlreadyDecided),
            TxOutcome::Missing => Err(BookingRepositoryError::query(format!(
                "booking {id} vanished during approval"
            ))),
        }
    }

    async fn list_for_booker(
        &self,
        booker: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        let mut query = bookings::table
            .filter(bookings::booker_id.eq(booker.get()))
            .select(BookingRow::as_select())
            .into_boxed();
        query = match state {
            BookingState::All => query,
            BookingState::Current => query
                .filter(bookings::start_date.lt(now))
                .filter(bookings::end_date.gt(now)),
            BookingState::Past => query.filter(bookings::end_date.lt(now)),
            BookingState::Future => query.filter(bookings::start_date.gt(now)),
            BookingState::Waiting => {
                query.filter(bookings::status.eq(BookingStatus::Waiting.as_str()))
            }
            BookingState::Rejected => {
                query.filter(bookings::status.eq(BookingStatus::Rejected.as_str()))
            }
        };

        let rows: Vec<BookingRow> = query
            .order(bookings::start_date.desc())
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(decode).collect()
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        state: BookingState,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        let mut query = bookings::table
            .inner_join(items::table)
            .filter(items::owner_id.eq(owner.get()))
            .select(BookingRow::as_select())
            .into_boxed();
        query = match state {
            BookingState::All => query,
            BookingState::Current => query
                .filter(bookings::start_date.lt(now))
                .filter(bookings::end_date.gt(now)),
            BookingState::Past => query.filter(bookings::end_date.lt(now)),
            BookingState::Future => query.filter(bookings::start_date.gt(now)),
            BookingState::Waiting => {
                query.filter(bookings::status.eq(BookingStatus::Waiting.as_str()))
            }
            BookingState::Rejected => {
                query.filter(bookings::status.eq(BookingStatus::Rejected.as_str()))
            }
        };

        let rows: Vec<BookingRow> = query
            .order(bookings::start_date.desc())
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(decode).collect()
    }

    async fn last_and_next_for_owner(
        &self,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<HashMap<ItemId, ItemSchedule>, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        let started: Vec<BookingRow> = bookings::table
            .inner_join(items::table)
            .filter(items::owner_id.eq(owner.get()))
            .filter(bookings::status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::start_date.lt(now))
            .order((bookings::item_id.asc(), bookings::end_date.desc()))
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        let upcoming: Vec<BookingRow> = bookings::table
            .inner_join(items::table)
            .filter(items::owner_id.eq(owner.get()))
            .filter(bookings::status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::start_date.gt(now))
            .order((bookings::item_id.asc(), bookings::start_date.asc()))
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        let mut schedules = HashMap::new();
        fold_first_per_item(&mut schedules, started, |schedule| &mut schedule.last)?;
        fold_first_per_item(&mut schedules, upcoming, |schedule| &mut schedule.next)?;
        Ok(schedules)
    }

    async fn has_completed_booking(
        &self,
        booker: UserId,
        item: ItemId,
        now: DateTime<Utc>,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.conn().await?;

        let completed: i64 = bookings::table
            .filter(bookings::booker_id.eq(booker.get()))
            .filter(bookings::item_id.eq(item.get()))
            .filter(bookings::status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::end_date.lt(now))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(completed > 0)
    }
}
