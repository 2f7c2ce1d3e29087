//! Driving port for report read views.

use async_trait::async_trait;

use crate::domain::{DashboardData, Error, ReportId, ReportSummary, SchemaReport};

/// Domain use-case port for reading stored reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportQuery: Send + Sync {
    /// Fetch one report with its full subtree.
    async fn get_report(&self, id: &ReportId) -> Result<SchemaReport, Error>;

    /// Subgraph summaries, recent reports, and the total count.
    async fn dashboard(&self) -> Result<DashboardData, Error>;

    /// Most recent reports across every subgraph.
    async fn recent_reports(&self, limit: u32) -> Result<Vec<ReportSummary>, Error>;

    /// Most recent reports for one subgraph.
    async fn subgraph_history(
        &self,
        subgraph_name: &str,
        limit: u32,
    ) -> Result<Vec<ReportSummary>, Error>;

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> Result<(), Error>;
}

/// Fixture query backed by an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportQuery;

#[async_trait]
impl ReportQuery for FixtureReportQuery {
    async fn get_report(&self, id: &ReportId) -> Result<SchemaReport, Error> {
        Err(Error::not_found(format!("report {id} not found")))
    }

    async fn dashboard(&self) -> Result<DashboardData, Error> {
        Ok(DashboardData {
            subgraphs: Vec::new(),
            recent_reports: Vec::new(),
            total_reports: 0,
        })
    }

    async fn recent_reports(&self, _limit: u32) -> Result<Vec<ReportSummary>, Error> {
        Ok(Vec::new())
    }

    async fn subgraph_history(
        &self,
        _subgraph_name: &str,
        _limit: u32,
    ) -> Result<Vec<ReportSummary>, Error> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
