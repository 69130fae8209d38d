//! Acting-user extraction from the `X-Sharer-User-Id` header.
//!
//! Every endpoint reads the caller's identity from this header; there is no
//! session layer in front of the service.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use serde_json::json;

use crate::domain::{Error, UserId};

/// Header carrying the acting user's id.
pub const SHARER_USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// The acting user, extracted from [`SHARER_USER_ID_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sharer(pub UserId);

impl Sharer {
    /// The extracted user id.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.0
    }
}

fn missing_header_error() -> Error {
    Error::invalid_request(format!("missing required header: {SHARER_USER_ID_HEADER}"))
        .with_details(json!({
            "header": SHARER_USER_ID_HEADER,
            "code": "missing_header",
        }))
}

fn invalid_header_error(value: &str) -> Error {
    Error::invalid_request(format!(
        "{SHARER_USER_ID_HEADER} must be a positive integer"
    ))
    .with_details(json!({
        "header": SHARER_USER_ID_HEADER,
        "value": value,
        "code": "invalid_header",
    }))
}

fn extract_sharer(req: &HttpRequest) -> Result<Sharer, Error> {
    let Some(raw) = req.headers().get(SHARER_USER_ID_HEADER) else {
        return Err(missing_header_error());
    };
    let raw = raw.to_str().map_err(|_| invalid_header_error("<binary>"))?;
    let id = raw
        .parse::<UserId>()
        .map_err(|_| invalid_header_error(raw))?;
    Ok(Sharer(id))
}

impl FromRequest for Sharer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_sharer(req))
    }
}
