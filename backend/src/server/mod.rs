//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub(crate) use metrics::make_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Condition;
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ReportService;
use backend::inbound::http::error::{json_error_handler, query_error_handler};
use backend::inbound::http::health::{HealthState, health, live, ready};
use backend::inbound::http::reports::{
    dashboard, get_report, get_report_by_query, list_reports, store_report, subgraph_history,
};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{DbPool, DieselReportRepository};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const CORS_MAX_AGE_SECS: usize = 3600;

/// Build handler state over the database when a pool is configured, falling
/// back to fixture ports otherwise.
fn build_http_state(db_pool: Option<&DbPool>) -> HttpState {
    match db_pool {
        Some(pool) => {
            let service = Arc::new(ReportService::new(Arc::new(DieselReportRepository::new(
                pool.clone(),
            ))));
            HttpState::new(service.clone(), service)
        }
        None => HttpState::default(),
    }
}

fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::HeaderName::from_static(backend::domain::TRACE_ID_HEADER)])
        .max_age(CORS_MAX_AGE_SECS)
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors_allow_any_origin: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors_allow_any_origin,
    } = deps;

    let api = web::scope("/api")
        .wrap(Condition::new(cors_allow_any_origin, build_cors()))
        .service(store_report)
        .service(list_reports)
        .service(get_report)
        .service(get_report_by_query)
        .service(dashboard)
        .service(subgraph_history)
        .service(health);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is left to the caller so startup can finish any remaining
/// checks before the probe flips.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(config.db_pool.as_ref()));
    let ServerConfig {
        bind_addr,
        cors_allow_any_origin,
        db_pool: _,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: health_state.clone(),
            http_state: http_state.clone(),
            cors_allow_any_origin,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
