//! Peer-to-peer item-sharing backend.
//!
//! Users list items, other users reserve time windows on them, and owners
//! approve or reject the reservations. The crate is laid out as a hexagon:
//! domain services and ports live under [`domain`], the REST adapter under
//! [`inbound`], and the PostgreSQL adapters under [`outbound`].

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;
