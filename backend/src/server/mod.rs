//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use mockable::DefaultClock;

use crate::domain::{
    BookingLifecycle, CommentService, OwnerAggregationView, TemporalClassifier,
};
use crate::inbound::http::bookings::{
    confirm_booking, create_booking, get_booking, list_bookings, list_owner_bookings,
};
use crate::inbound::http::health::{healthz, HealthState};
use crate::inbound::http::items::{create_comment, list_items};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselCommentRepository, DieselItemStore, DieselUserStore,
};

/// Assemble the HTTP state over database-backed adapters.
fn build_http_state(pool: &DbPool) -> HttpState {
    let bookings = Arc::new(DieselBookingRepository::new(pool.clone()));
    let items = Arc::new(DieselItemStore::new(pool.clone()));
    let users = Arc::new(DieselUserStore::new(pool.clone()));
    let comments = Arc::new(DieselCommentRepository::new(pool.clone()));
    let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);

    let lifecycle = Arc::new(BookingLifecycle::new(
        bookings.clone(),
        items.clone(),
        users.clone(),
        clock.clone(),
    ));
    let classifier = Arc::new(TemporalClassifier::new(
        bookings.clone(),
        users.clone(),
        clock.clone(),
    ));
    let aggregation = Arc::new(OwnerAggregationView::new(
        bookings.clone(),
        items.clone(),
        users.clone(),
        comments.clone(),
        clock.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(
        bookings, items.clone(), users.clone(), comments, clock,
    ));

    HttpState {
        booking_commands: lifecycle.clone(),
        booking_lookup: lifecycle,
        booking_queries: classifier,
        item_listing: aggregation,
        comments: comment_service,
        users,
        items,
    }
}

/// Construct an Actix HTTP server over the given configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config.db_pool));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .service(healthz)
            .service(create_booking)
            // The literal owner route must register before the {id} route.
            .service(list_owner_bookings)
            .service(list_bookings)
            .service(confirm_booking)
            .service(get_booking)
            .service(list_items)
            .service(create_comment)
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
