//! Embedded schema migrations.
//!
//! Migrations under `backend/migrations` are compiled into the binary and
//! applied in lexical (timestamp-prefixed) order. Diesel records each applied
//! version in `__diesel_schema_migrations`, so reruns are no-ops.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations bundled with the service.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open the dedicated migration connection.
    #[error("failed to connect for migrations: {message}")]
    Connection { message: String },
    /// A migration script failed.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    /// The blocking migration task did not complete.
    #[error("migration task failed: {message}")]
    Task { message: String },
}

fn run_blocking(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connection {
            message: err.to_string(),
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Apply every pending migration and return the versions applied.
///
/// Runs on a blocking thread because Diesel's migration harness is
/// synchronous.
///
/// # Errors
///
/// Returns [`MigrationError`] when the connection cannot be established or a
/// script fails; a failed script leaves earlier ones applied.
pub async fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_blocking(&url))
        .await
        .map_err(|err| MigrationError::Task {
            message: err.to_string(),
        })??;

    if applied.is_empty() {
        info!("database schema is up to date");
    } else {
        info!(versions = ?applied, "applied database migrations");
    }
    Ok(applied)
}
