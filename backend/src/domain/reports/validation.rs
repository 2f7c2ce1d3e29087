//! Draft validation and subgraph-name normalisation.

use super::{NewSchemaReport, ReportDraft, ReportValidationError, UNKNOWN_SUBGRAPH};

impl TryFrom<ReportDraft> for NewSchemaReport {
    type Error = ReportValidationError;

    fn try_from(value: ReportDraft) -> Result<Self, Self::Error> {
        if !value.score.is_finite() {
            return Err(ReportValidationError::NonFiniteScore { value: value.score });
        }
        validate_weighted_violations(value.total_weighted_violations)?;
        if value
            .metadata
            .as_ref()
            .is_some_and(|metadata| !metadata.is_null() && !metadata.is_object())
        {
            return Err(ReportValidationError::MetadataNotObject);
        }

        Ok(Self {
            id: value.id,
            subgraph_name: normalise_subgraph_name(value.subgraph_name),
            score: value.score,
            total_fields: value.total_fields,
            total_weighted_violations: value.total_weighted_violations,
            timestamp: value.timestamp,
            metadata: value.metadata.filter(|metadata| !metadata.is_null()),
            rule_results: value.rule_results,
        })
    }
}

fn validate_weighted_violations(value: f64) -> Result<(), ReportValidationError> {
    if !value.is_finite() {
        return Err(ReportValidationError::NonFiniteWeightedViolations { value });
    }
    if value < 0.0 {
        return Err(ReportValidationError::NegativeWeightedViolations { value });
    }
    Ok(())
}

/// Apply the `"Unknown"` default to absent names. Supplied names, blank
/// ones included, are kept as sent.
pub(super) fn normalise_subgraph_name(name: Option<String>) -> String {
    name.unwrap_or_else(|| UNKNOWN_SUBGRAPH.to_owned())
}
