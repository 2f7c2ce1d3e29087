//! Schema report HTTP handlers.
//!
//! ```text
//! POST /api/reports
//! GET  /api/reports?subgraph=&limit=
//! GET  /api/reports/{id}
//! GET  /api/report?id=
//! GET  /api/dashboard
//! GET  /api/subgraphs/{name}/reports?limit=
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{
    DashboardData, IncomingReport, ReportSummary, RuleResult, SchemaReport, SubgraphSummary,
    Trend, Violation, ViolationLocation,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TrendSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, ingestion_error, parse_limit, parse_report_id};

const STORED_MESSAGE: &str = "Report stored successfully";

/// Acknowledgement returned after a report is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreReportResponseBody {
    pub success: bool,
    #[schema(format = "uuid")]
    pub report_id: String,
    #[schema(example = "Report stored successfully")]
    pub message: String,
}

/// Report header without rule results.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummaryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub subgraph_name: String,
    pub score: f64,
    pub total_fields: u32,
    pub total_weighted_violations: f64,
    #[schema(format = "date-time")]
    pub timestamp: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<ReportSummary> for ReportSummaryBody {
    fn from(value: ReportSummary) -> Self {
        Self {
            id: value.id.to_string(),
            subgraph_name: value.subgraph_name,
            score: value.score,
            total_fields: value.total_fields,
            total_weighted_violations: value.total_weighted_violations,
            timestamp: value.timestamp.to_rfc3339(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Violation position; absent parts are omitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<String>,
}

impl From<ViolationLocation> for LocationBody {
    fn from(value: ViolationLocation) -> Self {
        Self {
            line: value.line,
            column: value.column,
            field: value.field,
            type_name: value.type_name,
            coordinate: value.coordinate,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViolationBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub rule_result_id: String,
    pub message: String,
    pub location: LocationBody,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Violation> for ViolationBody {
    fn from(value: Violation) -> Self {
        Self {
            id: value.id.to_string(),
            rule_result_id: value.rule_result_id.to_string(),
            message: value.message,
            location: value.location.into(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleResultBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub report_id: String,
    pub rule_name: String,
    pub violation_count: u32,
    pub message: String,
    pub violations: Vec<ViolationBody>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<RuleResult> for RuleResultBody {
    fn from(value: RuleResult) -> Self {
        Self {
            id: value.id.to_string(),
            report_id: value.report_id.to_string(),
            rule_name: value.rule_name,
            violation_count: value.violation_count,
            message: value.message,
            violations: value
                .violations
                .into_iter()
                .map(ViolationBody::from)
                .collect(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Full report with rule results ordered by violation count, descending.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetailBody {
    #[serde(flatten)]
    pub summary: ReportSummaryBody,
    /// Opaque caller metadata, stored verbatim.
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub rule_results: Vec<RuleResultBody>,
}

impl From<SchemaReport> for ReportDetailBody {
    fn from(mut value: SchemaReport) -> Self {
        let summary = value.summary().into();
        Self {
            summary,
            metadata: value.metadata.take(),
            rule_results: value
                .rule_results
                .into_iter()
                .map(RuleResultBody::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphSummaryBody {
    pub name: String,
    pub latest_score: f64,
    #[schema(format = "date-time")]
    pub latest_report: String,
    pub report_count: u64,
    #[schema(value_type = TrendSchema)]
    pub trend: Trend,
}

impl From<SubgraphSummary> for SubgraphSummaryBody {
    fn from(value: SubgraphSummary) -> Self {
        Self {
            name: value.name,
            latest_score: value.latest_score,
            latest_report: value.latest_report.to_rfc3339(),
            report_count: value.report_count,
            trend: value.trend,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBody {
    pub subgraphs: Vec<SubgraphSummaryBody>,
    pub recent_reports: Vec<ReportSummaryBody>,
    pub total_reports: u64,
}

impl From<DashboardData> for DashboardBody {
    fn from(value: DashboardData) -> Self {
        Self {
            subgraphs: value
                .subgraphs
                .into_iter()
                .map(SubgraphSummaryBody::from)
                .collect(),
            recent_reports: summaries(value.recent_reports),
            total_reports: value.total_reports,
        }
    }
}

fn summaries(reports: Vec<ReportSummary>) -> Vec<ReportSummaryBody> {
    reports.into_iter().map(ReportSummaryBody::from).collect()
}

/// Query parameters for listing reports.
#[derive(Debug, Default, Deserialize)]
pub struct ListReportsQuery {
    pub subgraph: Option<String>,
    pub limit: Option<i64>,
}

/// Query parameters for the legacy single-report lookup.
#[derive(Debug, Default, Deserialize)]
pub struct ReportIdQuery {
    pub id: Option<String>,
}

/// Query parameters for subgraph history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Accept a scoring run from the scanner.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = IncomingReport,
    responses(
        (status = 200, description = "Report stored", body = StoreReportResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "storeReport"
)]
#[post("/reports")]
pub async fn store_report(
    state: web::Data<HttpState>,
    payload: web::Json<IncomingReport>,
) -> ApiResult<web::Json<StoreReportResponseBody>> {
    let draft = payload
        .into_inner()
        .into_draft()
        .map_err(|err| ingestion_error(&err))?;
    let stored = state.reports.store_report(draft).await?;
    Ok(web::Json(StoreReportResponseBody {
        success: true,
        report_id: stored.id.to_string(),
        message: STORED_MESSAGE.to_owned(),
    }))
}

/// List recent reports, optionally restricted to one subgraph.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(
        ("subgraph" = Option<String>, Query, description = "Restrict to one subgraph"),
        ("limit" = Option<u32>, Query, description = "Number of reports to return, default 50, max 500")
    ),
    responses(
        (status = 200, description = "Report summaries, newest first", body = Vec<ReportSummaryBody>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "listReports"
)]
#[get("/reports")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    query: web::Query<ListReportsQuery>,
) -> ApiResult<web::Json<Vec<ReportSummaryBody>>> {
    let query = query.into_inner();
    let limit = parse_limit(query.limit, FieldName::new("limit"))?;
    let subgraph = query
        .subgraph
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let reports = match subgraph {
        Some(name) => state.reports_query.subgraph_history(name, limit).await?,
        None => state.reports_query.recent_reports(limit).await?,
    };
    Ok(web::Json(summaries(reports)))
}

/// Fetch one report with its rule results and violations.
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Report detail", body = ReportDetailBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getReport"
)]
#[get("/reports/{id}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReportDetailBody>> {
    let raw = path.into_inner();
    let id = parse_report_id(Some(&raw), FieldName::new("id"))?;
    let report = state.reports_query.get_report(&id).await?;
    Ok(web::Json(report.into()))
}

/// Fetch one report by `?id=`; kept for scanner tooling that predates the
/// path form.
#[utoipa::path(
    get,
    path = "/api/report",
    params(("id" = String, Query, description = "Report identifier")),
    responses(
        (status = 200, description = "Report detail", body = ReportDetailBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getReportByQuery"
)]
#[get("/report")]
pub async fn get_report_by_query(
    state: web::Data<HttpState>,
    query: web::Query<ReportIdQuery>,
) -> ApiResult<web::Json<ReportDetailBody>> {
    let id = parse_report_id(query.id.as_deref(), FieldName::new("id"))?;
    let report = state.reports_query.get_report(&id).await?;
    Ok(web::Json(report.into()))
}

/// Subgraph summaries, recent reports, and the total report count.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard view", body = DashboardBody),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getDashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(state: web::Data<HttpState>) -> ApiResult<web::Json<DashboardBody>> {
    let data = state.reports_query.dashboard().await?;
    Ok(web::Json(data.into()))
}

/// Recent reports for one subgraph, newest first.
#[utoipa::path(
    get,
    path = "/api/subgraphs/{name}/reports",
    params(
        ("name" = String, Path, description = "Subgraph name; `Unknown` matches unnamed reports"),
        ("limit" = Option<u32>, Query, description = "Number of reports to return, default 50, max 500")
    ),
    responses(
        (status = 200, description = "Report summaries, newest first", body = Vec<ReportSummaryBody>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getSubgraphHistory"
)]
#[get("/subgraphs/{name}/reports")]
pub async fn subgraph_history(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<Vec<ReportSummaryBody>>> {
    let name = path.into_inner();
    let limit = parse_limit(query.limit, FieldName::new("limit"))?;
    let reports = state.reports_query.subgraph_history(&name, limit).await?;
    Ok(web::Json(summaries(reports)))
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
