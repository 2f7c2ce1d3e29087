//! Server entry-point: loads settings, prepares the report store, and serves
//! the HTTP API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::domain::ports::ReportRepository as _;
use backend::outbound::persistence::{DbPool, DieselReportRepository, run_pending_migrations};
use backend::settings::ServerSettings;
use ortho_config::OrthoConfig;

#[cfg(feature = "metrics")]
use server::make_metrics;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("failed to load server settings")?;
    let bind_addr = settings.bind_addr()?;
    let database_url = settings.database_url();
    let pool_config = settings.pool_config(&database_url);

    let pool = DbPool::new(pool_config.clone())
        .await
        .wrap_err("failed to build database pool")?;
    // Fail fast when the database is unreachable rather than on first request.
    DieselReportRepository::new(pool.clone())
        .health_check()
        .await
        .wrap_err("database health check failed")?;

    if settings.run_migrations() {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("failed to apply database migrations")?;
    } else {
        info!("skipping database migrations");
    }

    info!(
        max_connections = pool_config.max_size(),
        min_idle = ?pool_config.min_idle(),
        max_lifetime = ?pool_config.max_lifetime(),
        connection_timeout = ?pool_config.connection_timeout(),
        "database pool configured"
    );

    let config = ServerConfig::new(bind_addr)
        .with_db_pool(pool)
        .with_cors_allow_any_origin(settings.cors_allow_any_origin());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    health_state.mark_ready();
    info!(%bind_addr, "schema score server listening");

    server.await?;
    Ok(())
}
