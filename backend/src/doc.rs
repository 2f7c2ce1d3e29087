//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every report and health endpoint plus the external
//! schema wrappers from [`crate::inbound::http::schemas`], which keep domain
//! types free of utoipa derives.
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{IncomingLocation, IncomingReport, IncomingRuleResult, IncomingViolation};
use crate::inbound::http::health::HealthResponseBody;
use crate::inbound::http::reports::{
    DashboardBody, LocationBody, ReportDetailBody, ReportSummaryBody, RuleResultBody,
    StoreReportResponseBody, SubgraphSummaryBody, ViolationBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, TrendSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Schema score API",
        description = "Ingestion and read views for GraphQL schema-quality reports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::reports::store_report,
        crate::inbound::http::reports::list_reports,
        crate::inbound::http::reports::get_report,
        crate::inbound::http::reports::get_report_by_query,
        crate::inbound::http::reports::dashboard,
        crate::inbound::http::reports::subgraph_history,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        IncomingReport,
        IncomingRuleResult,
        IncomingViolation,
        IncomingLocation,
        StoreReportResponseBody,
        ReportSummaryBody,
        ReportDetailBody,
        RuleResultBody,
        ViolationBody,
        LocationBody,
        SubgraphSummaryBody,
        DashboardBody,
        HealthResponseBody,
        ErrorSchema,
        ErrorCodeSchema,
        TrendSchema,
    )),
    tags(
        (name = "reports", description = "Schema report ingestion and read views"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
