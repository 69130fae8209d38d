//! PostgreSQL persistence adapters backed by Diesel.
//!
//! Each repository in this module implements one of the driven ports from
//! `crate::domain::ports` on top of an async connection pool. Rows are
//! converted at the boundary so domain types never leak Diesel details.

pub mod diesel_booking_repository;
pub mod diesel_comment_repository;
pub mod diesel_item_store;
pub mod diesel_user_store;
pub mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_item_store::DieselItemStore;
pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
