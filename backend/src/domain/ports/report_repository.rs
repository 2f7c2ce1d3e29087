//! Port for durable storage of schema-quality reports.
//!
//! The store owns the transactional fan-out of a report into rule results and
//! violations, and computes the cross-report aggregates the read views need.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{NewSchemaReport, ReportId, ReportSummary, SchemaReport, SubgraphSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "report repository query failed: {message}",
        /// No report exists with the requested identifier.
        NotFound { id: ReportId } =>
            "report {id} not found",
    }
}

/// Port for report persistence and aggregate reads.
///
/// Every operation either fully succeeds or returns an error; there is no
/// partial result shape.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist the report and its whole subtree in one transaction.
    ///
    /// The store assigns creation timestamps and child identifiers. A failure
    /// anywhere in the tree rolls back every row of the report.
    async fn store(&self, report: &NewSchemaReport) -> Result<SchemaReport, ReportRepositoryError>;

    /// Fetch a report with its rule results and violations.
    ///
    /// Rule results are ordered by violation count descending, then rule
    /// name ascending. Violations are ordered by line, then column, with
    /// absent locations last.
    async fn find_by_id(&self, id: &ReportId) -> Result<SchemaReport, ReportRepositoryError>;

    /// Most recent reports by event timestamp, summary fields only.
    async fn list_recent(&self, limit: u32) -> Result<Vec<ReportSummary>, ReportRepositoryError>;

    /// Most recent reports for one subgraph, summary fields only.
    ///
    /// `"Unknown"` also matches reports stored without a subgraph name.
    async fn list_by_subgraph(
        &self,
        subgraph_name: &str,
        limit: u32,
    ) -> Result<Vec<ReportSummary>, ReportRepositoryError>;

    /// Per-subgraph aggregates, newest latest report first.
    async fn subgraph_summaries(&self) -> Result<Vec<SubgraphSummary>, ReportRepositoryError>;

    /// Count of every stored report.
    async fn total_count(&self) -> Result<u64, ReportRepositoryError>;

    /// Verify the storage connection is reachable.
    async fn health_check(&self) -> Result<(), ReportRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// `store` echoes the report back as if it had been persisted. Lookups
/// report not found and listings are empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportRepository;

#[async_trait]
impl ReportRepository for FixtureReportRepository {
    async fn store(&self, report: &NewSchemaReport) -> Result<SchemaReport, ReportRepositoryError> {
        report
            .to_stored(Utc::now())
            .map_err(|err| ReportRepositoryError::query(err.to_string()))
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<SchemaReport, ReportRepositoryError> {
        Err(ReportRepositoryError::not_found(*id))
    }

    async fn list_recent(&self, _limit: u32) -> Result<Vec<ReportSummary>, ReportRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_by_subgraph(
        &self,
        _subgraph_name: &str,
        _limit: u32,
    ) -> Result<Vec<ReportSummary>, ReportRepositoryError> {
        Ok(Vec::new())
    }

    async fn subgraph_summaries(&self) -> Result<Vec<SubgraphSummary>, ReportRepositoryError> {
        Ok(Vec::new())
    }

    async fn total_count(&self) -> Result<u64, ReportRepositoryError> {
        Ok(0)
    }

    async fn health_check(&self) -> Result<(), ReportRepositoryError> {
        Ok(())
    }
}
