//! Shared validation helpers for inbound HTTP adapters.

use serde_json::{Value, json};

use crate::domain::{Error, IngestionError, ReportId};

/// Smallest accepted `limit` query value.
pub(crate) const MIN_LIMIT: u32 = 1;
/// Largest accepted `limit` query value.
pub(crate) const MAX_LIMIT: u32 = 500;
/// Limit applied when a listing request omits `limit`.
pub(crate) const DEFAULT_LIMIT: u32 = 50;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidLimit,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidLimit => "invalid_limit",
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

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: &str, value: impl Into<Value>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code,
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid.as_str(), value)
}

/// Parse a report identifier, treating blank input as missing.
pub(crate) fn parse_report_id(value: Option<&str>, field: FieldName) -> Result<ReportId, Error> {
    let raw = value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    raw.parse::<ReportId>()
        .map_err(|_| invalid_uuid_error(field, raw))
}

pub(crate) fn invalid_limit_error(field: FieldName, value: i64) -> Error {
    let field = field.as_str();
    ValidationError::new(
        field,
        format!("{field} must be between {MIN_LIMIT} and {MAX_LIMIT}"),
    )
    .with_value(ErrorCode::InvalidLimit.as_str(), value)
}

/// Resolve an optional `limit` to the accepted range, defaulting when absent.
pub(crate) fn parse_limit(value: Option<i64>, field: FieldName) -> Result<u32, Error> {
    let Some(raw) = value else {
        return Ok(DEFAULT_LIMIT);
    };
    u32::try_from(raw)
        .ok()
        .filter(|limit| (MIN_LIMIT..=MAX_LIMIT).contains(limit))
        .ok_or_else(|| invalid_limit_error(field, raw))
}

/// Map a failed translation of a scanner submission to a 400 payload.
pub(crate) fn ingestion_error(err: &IngestionError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_value(err.code(), err.value())
}
