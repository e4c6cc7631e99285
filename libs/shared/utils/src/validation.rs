use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} must be provided")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Blank(&'static str),

    #[error("invalid timestamp '{0}': expected RFC 3339 or YYYY-MM-DDTHH:MM:SS")]
    InvalidTimestamp(String),
}

pub fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing(field))
}

/// Present and not whitespace-only. The value is returned as given.
pub fn require_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = require(field, value)?;
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(value)
}

/// Accepts RFC 3339, or a naive local timestamp which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()))
}
