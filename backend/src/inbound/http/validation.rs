//! Shared validation helpers for the inbound HTTP adapter.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::{BookingError, BookingState, Error, Page};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidTimestamp,
    InvalidPage,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            ValidationCode::InvalidTimestamp => "invalid_timestamp",
            ValidationCode::InvalidPage => "invalid_page",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn validation_error(field: FieldName, code: ValidationCode, value: impl Into<String>) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} is invalid")).with_details(json!({
        "field": field,
        "value": value.into(),
        "code": code.as_str(),
    }))
}

/// Parse an ISO-8601 date-time.
///
/// Accepts a full RFC 3339 timestamp, or a zone-less local date-time which
/// is interpreted as UTC (the wire convention of the original clients).
pub(crate) fn parse_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| validation_error(field, ValidationCode::InvalidTimestamp, value))
}

/// Parse the `state` query keyword, defaulting to `ALL` when absent.
pub(crate) fn parse_state(value: Option<&str>) -> Result<BookingState, Error> {
    match value {
        None => Ok(BookingState::All),
        Some(raw) => raw
            .parse::<BookingState>()
            .map_err(|err| Error::from(BookingError::from(err))),
    }
}

/// Build a page from the `from`/`size` query parameters.
pub(crate) fn parse_page(from: Option<i64>, size: Option<i64>) -> Result<Page, Error> {
    let offset = from.unwrap_or(0);
    let limit = size.unwrap_or(Page::DEFAULT_LIMIT);
    Page::new(offset, limit).map_err(|err| {
        validation_error(
            FieldName::new("from/size"),
            ValidationCode::InvalidPage,
            err.to_string(),
        )
    })
}
