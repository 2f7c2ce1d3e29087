//! Report tree entities: drafts, validated write models, and read models.

use std::cmp::Ordering;
use std::num::TryFromIntError;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::ReportId;

/// Optional source location attached to a violation.
///
/// Every field is independently optional; absence is never encoded as zero
/// or an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationLocation {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub field: Option<String>,
    pub type_name: Option<String>,
    /// Dotted `Type.field` path.
    pub coordinate: Option<String>,
}

impl ViolationLocation {
    /// Returns `true` when no location detail was supplied.
    pub fn is_empty(&self) -> bool {
        self.line.is_none()
            && self.column.is_none()
            && self.field.is_none()
            && self.type_name.is_none()
            && self.coordinate.is_none()
    }
}

/// Violation awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewViolation {
    pub message: String,
    pub location: ViolationLocation,
}

/// Rule result awaiting persistence.
///
/// The violation count is derived from [`NewRuleResult::violations`] and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRuleResult {
    pub rule_name: String,
    pub message: String,
    pub violations: Vec<NewViolation>,
}

impl NewRuleResult {
    /// Number of violations recorded for this rule.
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Caller input for a new report.
///
/// Produced by the ingestion translation step. The subgraph name is still
/// optional here; [`NewSchemaReport`] applies the `"Unknown"` default.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub id: ReportId,
    pub subgraph_name: Option<String>,
    pub score: f64,
    pub total_fields: u32,
    pub total_weighted_violations: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<Value>,
    pub rule_results: Vec<NewRuleResult>,
}

/// Validated report tree ready to be stored.
///
/// Construct via `TryFrom<ReportDraft>`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchemaReport {
    pub(super) id: ReportId,
    pub(super) subgraph_name: String,
    pub(super) score: f64,
    pub(super) total_fields: u32,
    pub(super) total_weighted_violations: f64,
    pub(super) timestamp: DateTime<Utc>,
    pub(super) metadata: Option<Value>,
    pub(super) rule_results: Vec<NewRuleResult>,
}

impl NewSchemaReport {
    pub fn id(&self) -> ReportId {
        self.id
    }

    /// Subgraph name, already normalised.
    pub fn subgraph_name(&self) -> &str {
        self.subgraph_name.as_str()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn total_fields(&self) -> u32 {
        self.total_fields
    }

    pub fn total_weighted_violations(&self) -> f64 {
        self.total_weighted_violations
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Rule results in submission order.
    pub fn rule_results(&self) -> &[NewRuleResult] {
        self.rule_results.as_slice()
    }

    /// Build the read model this report would have once stored at
    /// `created_at`, with fresh child identifiers and read ordering applied.
    ///
    /// Used by the in-memory fixtures; the Diesel store assembles its own
    /// tree from the rows it inserted.
    ///
    /// # Errors
    /// Returns [`TryFromIntError`] when a rule result holds more violations
    /// than a `u32` can count.
    pub fn to_stored(&self, created_at: DateTime<Utc>) -> Result<SchemaReport, TryFromIntError> {
        let rule_results = self
            .rule_results
            .iter()
            .map(|rule| {
                let rule_result_id = Uuid::new_v4();
                Ok::<_, TryFromIntError>(RuleResult {
                    id: rule_result_id,
                    report_id: self.id,
                    rule_name: rule.rule_name.clone(),
                    violation_count: u32::try_from(rule.violation_count())?,
                    message: rule.message.clone(),
                    violations: rule
                        .violations
                        .iter()
                        .map(|violation| Violation {
                            id: Uuid::new_v4(),
                            rule_result_id,
                            message: violation.message.clone(),
                            location: violation.location.clone(),
                            created_at,
                        })
                        .collect(),
                    created_at,
                })
            })
            .collect::<Result<Vec<_>, TryFromIntError>>()?;

        let mut stored = SchemaReport {
            id: self.id,
            subgraph_name: self.subgraph_name.clone(),
            score: self.score,
            total_fields: self.total_fields,
            total_weighted_violations: self.total_weighted_violations,
            timestamp: self.timestamp,
            metadata: self.metadata.clone(),
            created_at,
            rule_results,
        };
        stored.apply_read_order();
        Ok(stored)
    }
}

/// Persisted violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub id: Uuid,
    pub rule_result_id: Uuid,
    pub message: String,
    pub location: ViolationLocation,
    pub created_at: DateTime<Utc>,
}

/// Persisted rule result with its violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub id: Uuid,
    pub report_id: ReportId,
    pub rule_name: String,
    /// Stored count; always equal to `violations.len()`.
    pub violation_count: u32,
    pub message: String,
    pub violations: Vec<Violation>,
    pub created_at: DateTime<Utc>,
}

/// Persisted report with its full rule-result subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    pub id: ReportId,
    pub subgraph_name: String,
    pub score: f64,
    pub total_fields: u32,
    pub total_weighted_violations: f64,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    /// Ordered by violation count descending, then rule name ascending.
    pub rule_results: Vec<RuleResult>,
}

impl SchemaReport {
    /// Order the subtree the way reads return it.
    ///
    /// Rule results sort by violation count descending, then rule name.
    /// Violations sort by line, then column, with absent values last. Both
    /// sorts are stable, so remaining ties keep submission order.
    pub fn apply_read_order(&mut self) {
        self.rule_results.sort_by(|left, right| {
            right
                .violation_count
                .cmp(&left.violation_count)
                .then_with(|| left.rule_name.cmp(&right.rule_name))
        });
        for rule in &mut self.rule_results {
            rule.violations.sort_by(|left, right| {
                present_first(left.location.line, right.location.line)
                    .then_with(|| present_first(left.location.column, right.location.column))
            });
        }
    }

    /// Drop the subtree, keeping listing fields only.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id,
            subgraph_name: self.subgraph_name.clone(),
            score: self.score,
            total_fields: self.total_fields,
            total_weighted_violations: self.total_weighted_violations,
            timestamp: self.timestamp,
            created_at: self.created_at,
        }
    }
}

/// Ascending order with absent values last, matching `NULLS LAST`.
fn present_first(left: Option<u32>, right: Option<u32>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Report listing row: scalar fields only, without rule results or metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub id: ReportId,
    pub subgraph_name: String,
    pub score: f64,
    pub total_fields: u32,
    pub total_weighted_violations: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
