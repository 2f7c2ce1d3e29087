//! Driving port for report ingestion.
//!
//! Inbound adapters hand validated drafts to this port without importing
//! persistence concerns.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Error, NewSchemaReport, ReportDraft, SchemaReport};

/// Domain use-case port for storing submitted reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportCommand: Send + Sync {
    /// Normalise the draft and persist it with its full subtree.
    async fn store_report(&self, draft: ReportDraft) -> Result<SchemaReport, Error>;
}

/// Fixture command that validates the draft and echoes it back unstored.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportCommand;

#[async_trait]
impl ReportCommand for FixtureReportCommand {
    async fn store_report(&self, draft: ReportDraft) -> Result<SchemaReport, Error> {
        let report = NewSchemaReport::try_from(draft)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        report
            .to_stored(Utc::now())
            .map_err(|err| Error::internal(format!("fixture store failed: {err}")))
    }
}
