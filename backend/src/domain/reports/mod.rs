//! Schema-quality report domain types.
//!
//! A report is one scoring run submitted by the external scanner. It owns an
//! ordered list of rule results, each of which owns an ordered list of
//! violations. Reports are immutable once stored.
//!
//! Drafts ([`ReportDraft`]) carry caller input; [`NewSchemaReport`] is the
//! validated tree handed to the store; [`SchemaReport`] and
//! [`ReportSummary`] are read models returned by it.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod entities;
mod summary;
mod validation;

pub use entities::{
    NewRuleResult, NewSchemaReport, NewViolation, ReportDraft, ReportSummary, RuleResult,
    SchemaReport, Violation, ViolationLocation,
};
pub use summary::{DashboardData, SubgraphSummary, Trend};

/// Subgraph name recorded when a submission omits one.
///
/// Lookups by this name also match legacy rows stored without a name.
pub const UNKNOWN_SUBGRAPH: &str = "Unknown";

/// Number of recent reports included in the dashboard view.
pub const DASHBOARD_RECENT_LIMIT: u32 = 10;

/// Validation errors raised while turning a [`ReportDraft`] into a
/// [`NewSchemaReport`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValidationError {
    NonFiniteScore { value: f64 },
    NonFiniteWeightedViolations { value: f64 },
    NegativeWeightedViolations { value: f64 },
    MetadataNotObject,
}

impl ReportValidationError {
    /// Wire field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonFiniteScore { .. } => "score",
            Self::NonFiniteWeightedViolations { .. } | Self::NegativeWeightedViolations { .. } => {
                "totalWeightedViolations"
            }
            Self::MetadataNotObject => "metadata",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NonFiniteScore { .. } | Self::NonFiniteWeightedViolations { .. } => "not_finite",
            Self::NegativeWeightedViolations { .. } => "negative_value",
            Self::MetadataNotObject => "metadata_not_object",
        }
    }
}

impl fmt::Display for ReportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteScore { value } => write!(f, "score must be finite (got {value})"),
            Self::NonFiniteWeightedViolations { value } => {
                write!(f, "total weighted violations must be finite (got {value})")
            }
            Self::NegativeWeightedViolations { value } => write!(
                f,
                "total weighted violations must be non-negative (got {value})"
            ),
            Self::MetadataNotObject => write!(f, "metadata must be a JSON object"),
        }
    }
}

impl std::error::Error for ReportValidationError {}

/// Stable report identifier, generated when a submission is translated.
///
/// # Examples
/// ```
/// use backend::domain::ReportId;
///
/// let id = ReportId::random();
/// let parsed: ReportId = id.to_string().parse().expect("round trip");
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generate a new random [`ReportId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl From<Uuid> for ReportId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}
