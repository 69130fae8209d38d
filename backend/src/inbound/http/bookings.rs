//! Booking HTTP handlers.
//!
//! ```text
//! POST  /bookings
//! PATCH /bookings/{id}?approved={bool}
//! GET   /bookings/{id}
//! GET   /bookings?state=ALL&from=0&size=20
//! GET   /bookings/owner?state=&from=&size=
//! ```

use std::collections::HashMap;

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Booking, BookingDraft, BookingError, BookingId, Error, ItemId, TimeSlot, UserId,
};
use crate::inbound::http::sharer::Sharer;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_page, parse_state, parse_timestamp, FieldName};
use crate::inbound::http::ApiResult;

/// Request payload for creating a booking.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequestBody {
    pub item_id: i64,
    pub start: String,
    pub end: String,
}

/// Query parameters for the confirm endpoint.
#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub approved: bool,
}

/// Query parameters shared by the two listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// Compact user reference embedded in booking JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRefBody {
    pub id: i64,
    pub name: String,
}

/// Compact item reference embedded in booking JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRefBody {
    pub id: i64,
    pub name: String,
}

/// Booking JSON returned by every booking endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponseBody {
    pub id: i64,
    pub start: String,
    pub end: String,
    pub status: String,
    pub booker: UserRefBody,
    pub item: ItemRefBody,
}

/// Cached name lookups so listing pages do not refetch per row.
#[derive(Default)]
struct NameCache {
    users: HashMap<UserId, String>,
    items: HashMap<ItemId, String>,
}

impl NameCache {
    async fn user_name(&mut self, state: &HttpState, id: UserId) -> ApiResult<String> {
        if let Some(name) = self.users.get(&id) {
            return Ok(name.clone());
        }
        let user = state
            .users
            .find_by_id(id)
            .await
            .map_err(BookingError::from)?
            .ok_or_else(|| Error::internal(format!("referenced user {id} missing")))?;
        let name = user.name().to_owned();
        self.users.insert(id, name.clone());
        Ok(name)
    }

    async fn item_name(&mut self, state: &HttpState, id: ItemId) -> ApiResult<String> {
        if let Some(name) = self.items.get(&id) {
            return Ok(name.clone());
        }
        let item = state
            .items
            .find_by_id(id)
            .await
            .map_err(BookingError::from)?
            .ok_or_else(|| Error::internal(format!("referenced item {id} missing")))?;
        let name = item.name().to_owned();
        self.items.insert(id, name.clone());
        Ok(name)
    }

    async fn render(&mut self, state: &HttpState, booking: &Booking) -> ApiResult<BookingResponseBody> {
        let booker_name = self.user_name(state, booking.booker()).await?;
        let item_name = self.item_name(state, booking.item()).await?;
        Ok(BookingResponseBody {
            id: booking.id().get(),
            start: booking.slot().start().to_rfc3339(),
            end: booking.slot().end().to_rfc3339(),
            status: booking.status().as_str().to_owned(),
            booker: UserRefBody {
                id: booking.booker().get(),
                name: booker_name,
            },
            item: ItemRefBody {
                id: booking.item().get(),
                name: item_name,
            },
        })
    }
}

async fn render_one(state: &HttpState, booking: Booking) -> ApiResult<BookingResponseBody> {
    NameCache::default().render(state, &booking).await
}

async fn render_many(
    state: &HttpState,
    bookings: Vec<Booking>,
) -> ApiResult<Vec<BookingResponseBody>> {
    let mut cache = NameCache::default();
    let mut rendered = Vec::with_capacity(bookings.len());
    for booking in &bookings {
        rendered.push(cache.render(state, booking).await?);
    }
    Ok(rendered)
}

fn parse_draft(payload: CreateBookingRequestBody, booker: UserId) -> Result<BookingDraft, Error> {
    let start = parse_timestamp(&payload.start, FieldName::new("start"))?;
    let end = parse_timestamp(&payload.end, FieldName::new("end"))?;
    let slot = TimeSlot::new(start, end).map_err(|err| {
        Error::from(BookingError::InvalidRange {
            reason: err.to_string(),
        })
    })?;
    Ok(BookingDraft {
        slot,
        item: ItemId::new(payload.item_id),
        booker,
    })
}

/// Create a `WAITING` booking for the acting user.
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    sharer: Sharer,
    payload: web::Json<CreateBookingRequestBody>,
) -> ApiResult<web::Json<BookingResponseBody>> {
    let draft = parse_draft(payload.into_inner(), sharer.user_id())?;
    let booking = state.booking_commands.create(draft).await?;
    Ok(web::Json(render_one(&state, booking).await?))
}

/// Approve or reject a waiting booking as the item owner.
#[patch("/bookings/{id}")]
pub async fn confirm_booking(
    state: web::Data<HttpState>,
    sharer: Sharer,
    path: web::Path<i64>,
    query: web::Query<ConfirmQuery>,
) -> ApiResult<web::Json<BookingResponseBody>> {
    let booking_id = BookingId::new(path.into_inner());
    let booking = state
        .booking_commands
        .confirm(booking_id, sharer.user_id(), query.approved)
        .await?;
    Ok(web::Json(render_one(&state, booking).await?))
}

/// Fetch one booking; visible to its booker or the item owner only.
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    sharer: Sharer,
    path: web::Path<i64>,
) -> ApiResult<web::Json<BookingResponseBody>> {
    let booking_id = BookingId::new(path.into_inner());
    let booking = state
        .booking_lookup
        .get_by_id(booking_id, sharer.user_id())
        .await?;
    Ok(web::Json(render_one(&state, booking).await?))
}

/// List the acting user's bookings, newest start first.
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    sharer: Sharer,
    query: web::Query<ListingQuery>,
) -> ApiResult<web::Json<Vec<BookingResponseBody>>> {
    let booking_state = parse_state(query.state.as_deref())?;
    let page = parse_page(query.from, query.size)?;
    let bookings = state
        .booking_queries
        .list_for_booker(sharer.user_id(), booking_state, page)
        .await?;
    Ok(web::Json(render_many(&state, bookings).await?))
}

/// List bookings of every item the acting user owns, newest start first.
#[get("/bookings/owner")]
pub async fn list_owner_bookings(
    state: web::Data<HttpState>,
    sharer: Sharer,
    query: web::Query<ListingQuery>,
) -> ApiResult<web::Json<Vec<BookingResponseBody>>> {
    let booking_state = parse_state(query.state.as_deref())?;
    let page = parse_page(query.from, query.size)?;
    let bookings = state
        .booking_queries
        .list_for_owner(sharer.user_id(), booking_state, page)
        .await?;
    Ok(web::Json(render_many(&state, bookings).await?))
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
