//! Health endpoints: liveness and readiness probes for orchestration, plus
//! the `/api/health` dependency check used by the scanner and dashboards.
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. 200 once the pool is verified and migrations ran.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. 200 while the process is marked alive and 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Body returned by a passing dependency check.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponseBody {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(format = "date-time")]
    pub time: String,
}

/// Check that the report store answers a trivial query.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Report store reachable", body = HealthResponseBody),
        (status = 503, description = "Report store unreachable", body = ErrorSchema)
    ),
    operation_id = "healthCheck"
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> ApiResult<web::Json<HealthResponseBody>> {
    state.reports_query.health_check().await.inspect_err(|err| {
        warn!(code = ?err.code(), "health check failed");
    })?;
    Ok(web::Json(HealthResponseBody {
        status: "healthy".to_owned(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}
