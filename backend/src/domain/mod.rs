//! Domain primitives, ports, and services.
//!
//! Purpose: define the schema-quality report model, the translation of
//! scanner submissions into it, and the service that sits between transport
//! adapters and the report store. Nothing here depends on HTTP or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - TraceId: request correlation identifier.
//! - Report types (`reports`): drafts, stored reports, summaries, trends.
//! - IncomingReport: scanner submission DTO and its translation.
//! - ReportService: implementation of the report driving ports.

pub mod error;
pub mod ingestion;
pub mod ports;
pub mod report_service;
pub mod reports;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ingestion::{
    IncomingLocation, IncomingReport, IncomingRuleResult, IncomingViolation, IngestionError,
};
pub use self::report_service::ReportService;
pub use self::reports::{
    DASHBOARD_RECENT_LIMIT, DashboardData, NewRuleResult, NewSchemaReport, NewViolation,
    ReportDraft, ReportId, ReportSummary, ReportValidationError, RuleResult, SchemaReport,
    SubgraphSummary, Trend, UNKNOWN_SUBGRAPH, Violation, ViolationLocation,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such report"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
