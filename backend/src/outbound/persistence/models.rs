//! Diesel row types and their conversions into domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Booking, BookingId, BookingStatus, Item, ItemId, TimeSlot, User, UserId,
};

use super::schema::{bookings, comments, items, users};

/// Row representation of a user account.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(UserId::new(row.id), row.name, row.email)
    }
}

/// Row representation of a shared item.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemRow {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item::new(
            ItemId::new(row.id),
            UserId::new(row.owner_id),
            row.name,
            row.description,
            row.available,
        )
    }
}

/// Row representation of a booking.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: String,
}

/// Error raised when a stored booking row violates domain invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowDecodeError {
    /// The `status` column holds an unknown state name.
    #[error("booking {id} has unknown status '{status}'")]
    UnknownStatus { id: i64, status: String },
    /// The stored window is empty or inverted.
    #[error("booking {id} has an empty or inverted time window")]
    InvalidWindow { id: i64 },
}

impl TryFrom<BookingRow> for Booking {
    type Error = RowDecodeError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|err| RowDecodeError::UnknownStatus {
                id: row.id,
                status: err.0,
            })?;
        let slot = TimeSlot::new(row.start_date, row.end_date)
            .map_err(|_| RowDecodeError::InvalidWindow { id: row.id })?;
        Ok(Booking::new(
            BookingId::new(row.id),
            slot,
            ItemId::new(row.item_id),
            UserId::new(row.booker_id),
            status,
        ))
    }
}

/// Insert payload for a new booking.
#[derive(Debug, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow<'a> {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: &'a str,
}

/// Row representation of a comment.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: i64,
    pub item_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// Insert payload for a new comment.
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow<'a> {
    pub item_id: i64,
    pub author_id: i64,
    pub text: &'a str,
    pub created: DateTime<Utc>,
}
