//! Tests for booking HTTP handlers.

use super::*;
use crate::domain::{
    BookingLifecycle, BookingStatus, Item, TemporalClassifier, User,
};
use crate::inbound::http::sharer::SHARER_USER_ID_HEADER;
use crate::test_support::{
    fixture_now, hours_from_now, slot, FixtureClock, InMemoryBookingRepository,
    InMemoryCommentRepository, InMemoryItemStore, InMemoryUserStore,
};
use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

const OWNER: i64 = 1;
const BOOKER: i64 = 2;
const STRANGER: i64 = 9;
const ITEM: i64 = 10;

struct World {
    state: HttpState,
    bookings: Arc<InMemoryBookingRepository>,
}

fn world() -> World {
    let users = InMemoryUserStore::with_users([
        User::new(UserId::new(OWNER), "Olga", "olga@example.com"),
        User::new(UserId::new(BOOKER), "Boris", "boris@example.com"),
        User::new(UserId::new(STRANGER), "Sasha", "sasha@example.com"),
    ]);
    let items = InMemoryItemStore::with_items([Item::new(
        ItemId::new(ITEM),
        UserId::new(OWNER),
        "Drill",
        "Percussion drill",
        true,
    )]);
    let bookings = InMemoryBookingRepository::new(items.clone());
    let comments = InMemoryCommentRepository::new(users.clone(), items.clone());
    let clock = FixtureClock::pinned(fixture_now());

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
    let aggregation = Arc::new(crate::domain::OwnerAggregationView::new(
        bookings.clone(),
        items.clone(),
        users.clone(),
        comments.clone(),
        clock.clone(),
    ));
    let comment_service = Arc::new(crate::domain::CommentService::new(
        bookings.clone(),
        items.clone(),
        users.clone(),
        comments,
        clock,
    ));

    let state = HttpState {
        booking_commands: lifecycle.clone(),
        booking_lookup: lifecycle,
        booking_queries: classifier,
        item_listing: aggregation,
        comments: comment_service,
        users,
        items,
    };
    World { state, bookings }
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(create_booking)
        .service(list_owner_bookings)
        .service(list_bookings)
        .service(confirm_booking)
        .service(get_booking)
}

fn booking_payload(from: i64, to: i64) -> Value {
    json!({
        "itemId": ITEM,
        "start": hours_from_now(from).to_rfc3339(),
        "end": hours_from_now(to).to_rfc3339(),
    })
}

#[actix_web::test]
async fn create_booking_returns_waiting_with_names() {
    let world = world();
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/bookings")
        .insert_header((SHARER_USER_ID_HEADER, BOOKER.to_string()))
        .set_json(booking_payload(24, 48))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: BookingResponseBody = actix_test::read_body_json(response).await;
    assert_eq!(body.status, "WAITING");
    assert_eq!(body.booker, UserRefBody { id: BOOKER, name: "Boris".to_owned() });
    assert_eq!(body.item, ItemRefBody { id: ITEM, name: "Drill".to_owned() });
}

#[actix_web::test]
async fn create_booking_without_sharer_header_is_rejected() {
    let world = world();
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/bookings")
        .set_json(booking_payload(24, 48))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_booking_with_past_start_is_rejected() {
    let world = world();
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/bookings")
        .insert_header((SHARER_USER_ID_HEADER, BOOKER.to_string()))
        .set_json(booking_payload(-2, 2))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn owner_booking_own_item_reads_as_not_found() {
    let world = world();
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/bookings")
        .insert_header((SHARER_USER_ID_HEADER, OWNER.to_string()))
        .set_json(booking_payload(24, 48))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn owner_approves_a_waiting_booking() {
    let world = world();
    let seeded = world.bookings.seed(
        slot(24, 48),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Waiting,
    );
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/bookings/{}?approved=true", seeded.id()))
        .insert_header((SHARER_USER_ID_HEADER, OWNER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: BookingResponseBody = actix_test::read_body_json(response).await;
    assert_eq!(body.status, "APPROVED");
}

#[actix_web::test]
async fn booker_confirming_own_request_reads_as_not_found() {
    let world = world();
    let seeded = world.bookings.seed(
        slot(24, 48),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Waiting,
    );
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/bookings/{}?approved=true", seeded.id()))
        .insert_header((SHARER_USER_ID_HEADER, BOOKER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn second_confirmation_is_a_bad_request() {
    let world = world();
    let seeded = world.bookings.seed(
        slot(24, 48),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Approved,
    );
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/bookings/{}?approved=false", seeded.id()))
        .insert_header((SHARER_USER_ID_HEADER, OWNER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn stranger_cannot_see_a_booking() {
    let world = world();
    let seeded = world.bookings.seed(
        slot(24, 48),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Waiting,
    );
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/bookings/{}", seeded.id()))
        .insert_header((SHARER_USER_ID_HEADER, STRANGER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn booker_listing_defaults_to_all_newest_first() {
    let world = world();
    world.bookings.seed(
        slot(-48, -24),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Approved,
    );
    world.bookings.seed(
        slot(24, 48),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Waiting,
    );
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::get()
        .uri("/bookings")
        .insert_header((SHARER_USER_ID_HEADER, BOOKER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<BookingResponseBody> = actix_test::read_body_json(response).await;
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].status, "WAITING");
    assert_eq!(body[1].status, "APPROVED");
}

#[actix_web::test]
async fn owner_listing_uses_the_owner_route() {
    let world = world();
    world.bookings.seed(
        slot(24, 48),
        ItemId::new(ITEM),
        UserId::new(BOOKER),
        BookingStatus::Waiting,
    );
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::get()
        .uri("/bookings/owner?state=WAITING")
        .insert_header((SHARER_USER_ID_HEADER, OWNER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<BookingResponseBody> = actix_test::read_body_json(response).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].booker.name, "Boris");
}

#[actix_web::test]
async fn unknown_state_keyword_reports_the_value() {
    let world = world();
    let app = actix_test::init_service(test_app(world.state)).await;

    let request = actix_test::TestRequest::get()
        .uri("/bookings?state=SOON")
        .insert_header((SHARER_USER_ID_HEADER, BOOKER.to_string()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Unknown state: SOON")
    );
}
