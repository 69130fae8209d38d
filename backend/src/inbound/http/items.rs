//! Item HTTP handlers.
//!
//! ```text
//! GET  /items
//! POST /items/{id}/comment
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Booking, Comment, EnrichedItem, ItemId};
use crate::inbound::http::sharer::Sharer;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Compact booking reference embedded in item JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRefBody {
    pub id: i64,
    pub booker_id: i64,
    pub start: String,
    pub end: String,
}

impl From<&Booking> for BookingRefBody {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id().get(),
            booker_id: booking.booker().get(),
            start: booking.slot().start().to_rfc3339(),
            end: booking.slot().end().to_rfc3339(),
        }
    }
}

/// Comment JSON returned inside item listings and from the create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponseBody {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: String,
}

impl From<&Comment> for CommentResponseBody {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id(),
            text: comment.text().to_owned(),
            author_name: comment.author_name().to_owned(),
            created: comment.created().to_rfc3339(),
        }
    }
}

/// Item JSON enriched with its booking schedule and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItemResponseBody {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub last_booking: Option<BookingRefBody>,
    pub next_booking: Option<BookingRefBody>,
    pub comments: Vec<CommentResponseBody>,
}

impl From<&EnrichedItem> for EnrichedItemResponseBody {
    fn from(enriched: &EnrichedItem) -> Self {
        Self {
            id: enriched.item.id().get(),
            name: enriched.item.name().to_owned(),
            description: enriched.item.description().to_owned(),
            available: enriched.item.available(),
            last_booking: enriched.last_booking.as_ref().map(BookingRefBody::from),
            next_booking: enriched.next_booking.as_ref().map(BookingRefBody::from),
            comments: enriched
                .comments
                .iter()
                .map(CommentResponseBody::from)
                .collect(),
        }
    }
}

/// Request payload for creating a comment.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequestBody {
    pub text: String,
}

/// List the acting user's items with last/next bookings and comments.
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    sharer: Sharer,
) -> ApiResult<web::Json<Vec<EnrichedItemResponseBody>>> {
    let enriched = state.item_listing.enriched_items(sharer.user_id()).await?;
    Ok(web::Json(
        enriched.iter().map(EnrichedItemResponseBody::from).collect(),
    ))
}

/// Leave a comment on an item the acting user has rented.
#[post("/items/{id}/comment")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    sharer: Sharer,
    path: web::Path<i64>,
    payload: web::Json<CreateCommentRequestBody>,
) -> ApiResult<web::Json<CommentResponseBody>> {
    let item = ItemId::new(path.into_inner());
    let comment = state
        .comments
        .create_comment(item, sharer.user_id(), payload.into_inner().text)
        .await?;
    Ok(web::Json(CommentResponseBody::from(&comment)))
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
