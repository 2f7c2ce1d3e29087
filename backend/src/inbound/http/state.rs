//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FixtureReportCommand, FixtureReportQuery, ReportCommand, ReportQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub reports: Arc<dyn ReportCommand>,
    pub reports_query: Arc<dyn ReportQuery>,
}

impl HttpState {
    /// Construct state from the report ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{FixtureReportCommand, FixtureReportQuery};
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureReportCommand), Arc::new(FixtureReportQuery));
    /// let _query = state.reports_query.clone();
    /// ```
    pub fn new(reports: Arc<dyn ReportCommand>, reports_query: Arc<dyn ReportQuery>) -> Self {
        Self {
            reports,
            reports_query,
        }
    }
}

impl Default for HttpState {
    /// State backed by fixture ports that never touch a database.
    fn default() -> Self {
        Self::new(Arc::new(FixtureReportCommand), Arc::new(FixtureReportQuery))
    }
}
