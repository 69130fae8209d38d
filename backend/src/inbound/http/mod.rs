//! HTTP inbound adapter exposing the booking REST endpoints.

pub mod bookings;
pub mod error;
pub mod health;
pub mod items;
pub mod sharer;
pub mod state;
pub mod validation;

pub use error::ApiResult;
