//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and remain testable without I/O. The two read-only stores
//! are present for response assembly: booking JSON carries the booker's and
//! the item's display names.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCommand, BookingLookup, BookingQuery, CommentCommand, ItemListingQuery, ItemStore,
    UserStore,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub booking_commands: Arc<dyn BookingCommand>,
    pub booking_lookup: Arc<dyn BookingLookup>,
    pub booking_queries: Arc<dyn BookingQuery>,
    pub item_listing: Arc<dyn ItemListingQuery>,
    pub comments: Arc<dyn CommentCommand>,
    pub users: Arc<dyn UserStore>,
    pub items: Arc<dyn ItemStore>,
}
