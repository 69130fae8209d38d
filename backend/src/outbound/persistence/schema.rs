//! Diesel table definitions for the sharing schema.
//!
//! Kept in sync with the SQL migrations under `backend/migrations/`.

diesel::table! {
    /// Registered platform users.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
    }
}

diesel::table! {
    /// Items offered for sharing, owned by a user.
    items (id) {
        id -> Int8,
        owner_id -> Int8,
        name -> Varchar,
        description -> Text,
        available -> Bool,
    }
}

diesel::table! {
    /// Booking requests for an item over a half-open time slot.
    bookings (id) {
        id -> Int8,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        item_id -> Int8,
        booker_id -> Int8,
        #[max_length = 16]
        status -> Varchar,
    }
}

diesel::table! {
    /// Renter feedback left after a completed booking.
    comments (id) {
        id -> Int8,
        item_id -> Int8,
        author_id -> Int8,
        text -> Text,
        created -> Timestamptz,
    }
}

diesel::joinable!(items -> users (owner_id));
diesel::joinable!(bookings -> items (item_id));
diesel::joinable!(bookings -> users (booker_id));
diesel::joinable!(comments -> items (item_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, items, bookings, comments);
