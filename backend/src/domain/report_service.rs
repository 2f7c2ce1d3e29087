//! Report domain service.
//!
//! Implements the [`ReportCommand`] and [`ReportQuery`] driving ports on top
//! of a [`ReportRepository`]. The service holds no state of its own and never
//! retries; every repository failure surfaces as a domain [`Error`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{ReportCommand, ReportQuery, ReportRepository, ReportRepositoryError};
use crate::domain::{
    DASHBOARD_RECENT_LIMIT, DashboardData, Error, NewSchemaReport, ReportDraft, ReportId,
    ReportSummary, ReportValidationError, SchemaReport,
};

/// Report service implementing the driving ports.
#[derive(Clone)]
pub struct ReportService<R> {
    repository: Arc<R>,
}

impl<R> ReportService<R> {
    /// Create a new service over the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> ReportService<R>
where
    R: ReportRepository,
{
    fn map_repository_error(operation: &str, error: ReportRepositoryError) -> Error {
        match error {
            ReportRepositoryError::Connection { message } => Error::service_unavailable(format!(
                "report repository unavailable during {operation}: {message}"
            )),
            ReportRepositoryError::Query { message } => Error::internal(format!(
                "report repository error during {operation}: {message}"
            )),
            ReportRepositoryError::NotFound { id } => {
                Error::not_found(format!("report {id} not found"))
                    .with_details(json!({ "id": id.to_string(), "code": "report_not_found" }))
            }
        }
    }

    fn map_validation_error(error: &ReportValidationError) -> Error {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": error.field(),
            "code": error.code(),
        }))
    }
}

#[async_trait]
impl<R> ReportCommand for ReportService<R>
where
    R: ReportRepository,
{
    async fn store_report(&self, draft: ReportDraft) -> Result<SchemaReport, Error> {
        let report =
            NewSchemaReport::try_from(draft).map_err(|err| Self::map_validation_error(&err))?;
        let stored = self
            .repository
            .store(&report)
            .await
            .map_err(|err| Self::map_repository_error("store", err))?;
        info!(
            report_id = %stored.id,
            subgraph = %stored.subgraph_name,
            score = stored.score,
            rule_results = stored.rule_results.len(),
            "stored schema report"
        );
        Ok(stored)
    }
}

#[async_trait]
impl<R> ReportQuery for ReportService<R>
where
    R: ReportRepository,
{
    async fn get_report(&self, id: &ReportId) -> Result<SchemaReport, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|err| Self::map_repository_error("find_by_id", err))
    }

    async fn dashboard(&self) -> Result<DashboardData, Error> {
        let subgraphs = self
            .repository
            .subgraph_summaries()
            .await
            .map_err(|err| Self::map_repository_error("subgraph_summaries", err))?;
        let recent_reports = self
            .repository
            .list_recent(DASHBOARD_RECENT_LIMIT)
            .await
            .map_err(|err| Self::map_repository_error("list_recent", err))?;
        let total_reports = self
            .repository
            .total_count()
            .await
            .map_err(|err| Self::map_repository_error("total_count", err))?;
        debug!(
            subgraphs = subgraphs.len(),
            total_reports, "assembled dashboard"
        );

        Ok(DashboardData {
            subgraphs,
            recent_reports,
            total_reports,
        })
    }

    async fn recent_reports(&self, limit: u32) -> Result<Vec<ReportSummary>, Error> {
        self.repository
            .list_recent(limit)
            .await
            .map_err(|err| Self::map_repository_error("list_recent", err))
    }

    async fn subgraph_history(
        &self,
        subgraph_name: &str,
        limit: u32,
    ) -> Result<Vec<ReportSummary>, Error> {
        self.repository
            .list_by_subgraph(subgraph_name, limit)
            .await
            .map_err(|err| Self::map_repository_error("list_by_subgraph", err))
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.repository
            .health_check()
            .await
            .map_err(|err| Self::map_repository_error("health_check", err))
    }
}

#[cfg(test)]
#[path = "report_service_tests.rs"]
mod tests;
