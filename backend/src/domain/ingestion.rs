//! Translation of scanner submissions into report drafts.
//!
//! The scanner posts loosely typed JSON. [`IncomingReport`] mirrors that wire
//! shape and [`IncomingReport::into_draft`] validates it at the boundary. A
//! rejected submission never produces a draft, so nothing reaches the store.
//! This step has no knowledge of persistence.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::reports::{NewRuleResult, NewViolation, ReportDraft, ReportId, ViolationLocation};

/// Largest count or position accepted; the store keeps these in `INTEGER`
/// columns.
pub const MAX_STORED_INTEGER: u32 = i32::MAX.unsigned_abs();

/// Errors raised while translating a submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestionError {
    /// The timestamp is not an RFC 3339 date-time with offset.
    #[error("timestamp must be an RFC 3339 date-time with offset")]
    InvalidTimestamp { value: String },
    /// An integer field was negative or too large.
    #[error("{field} must be an integer between 0 and {max}")]
    IntegerOutOfRange { field: String, value: i64, max: u32 },
}

impl IngestionError {
    /// Wire field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidTimestamp { .. } => "timestamp",
            Self::IntegerOutOfRange { field, .. } => field.as_str(),
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
            Self::IntegerOutOfRange { .. } => "out_of_range",
        }
    }

    /// Offending value, echoed back to the caller.
    pub fn value(&self) -> Value {
        match self {
            Self::InvalidTimestamp { value } => Value::from(value.as_str()),
            Self::IntegerOutOfRange { value, .. } => Value::from(*value),
        }
    }
}

/// Report submission as posted by the scanner.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingReport {
    /// RFC 3339 timestamp of the scoring run.
    #[schema(example = "2025-06-01T12:00:00Z")]
    pub timestamp: String,
    #[serde(default)]
    pub subgraph_name: Option<String>,
    pub score: f64,
    #[schema(minimum = 0)]
    pub total_fields: i64,
    #[schema(minimum = 0)]
    pub total_weighted_violations: f64,
    #[serde(default)]
    pub rule_results: Vec<IncomingRuleResult>,
    /// Opaque key-value map stored verbatim.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

/// One rule outcome within a submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRuleResult {
    pub rule: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub violations: Vec<IncomingViolation>,
}

/// One flagged issue within a rule outcome.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingViolation {
    pub message: String,
    #[serde(default)]
    pub location: IncomingLocation,
}

/// Optional location detail; every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingLocation {
    pub line: Option<i64>,
    pub column: Option<i64>,
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub coordinate: Option<String>,
}

impl IncomingReport {
    /// Validate the submission and build a draft with a fresh identifier.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::IncomingReport;
    /// use serde_json::json;
    ///
    /// let incoming: IncomingReport = serde_json::from_value(json!({
    ///     "timestamp": "2025-06-01T12:00:00+02:00",
    ///     "score": 91.5,
    ///     "totalFields": 40,
    ///     "totalWeightedViolations": 2.0
    /// }))
    /// .expect("valid payload");
    /// let draft = incoming.into_draft().expect("valid submission");
    /// assert!(draft.subgraph_name.is_none());
    /// ```
    pub fn into_draft(self) -> Result<ReportDraft, IngestionError> {
        let timestamp = parse_timestamp(self.timestamp)?;
        let total_fields = non_negative("totalFields".to_owned(), self.total_fields)?;
        let rule_results = self
            .rule_results
            .into_iter()
            .enumerate()
            .map(|(index, rule)| rule.into_new(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReportDraft {
            id: ReportId::random(),
            subgraph_name: self.subgraph_name,
            score: self.score,
            total_fields,
            total_weighted_violations: self.total_weighted_violations,
            timestamp,
            metadata: self.metadata,
            rule_results,
        })
    }
}

impl IncomingRuleResult {
    fn into_new(self, index: usize) -> Result<NewRuleResult, IngestionError> {
        let violations = self
            .violations
            .into_iter()
            .enumerate()
            .map(|(position, violation)| violation.into_new(index, position))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NewRuleResult {
            rule_name: self.rule,
            message: self.message,
            violations,
        })
    }
}

impl IncomingViolation {
    fn into_new(self, rule: usize, position: usize) -> Result<NewViolation, IngestionError> {
        let prefix = format!("ruleResults[{rule}].violations[{position}].location");
        let IncomingLocation {
            line,
            column,
            field,
            type_name,
            coordinate,
        } = self.location;
        let line = line
            .map(|value| non_negative(format!("{prefix}.line"), value))
            .transpose()?;
        let column = column
            .map(|value| non_negative(format!("{prefix}.column"), value))
            .transpose()?;

        Ok(NewViolation {
            message: self.message,
            location: ViolationLocation {
                line,
                column,
                field,
                type_name,
                coordinate,
            },
        })
    }
}

fn parse_timestamp(raw: String) -> Result<DateTime<Utc>, IngestionError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| IngestionError::InvalidTimestamp { value: raw })
}

fn non_negative(field: String, value: i64) -> Result<u32, IngestionError> {
    i32::try_from(value)
        .ok()
        .and_then(|stored| u32::try_from(stored).ok())
        .ok_or(IngestionError::IntegerOutOfRange {
            field,
            value,
            max: MAX_STORED_INTEGER,
        })
}
