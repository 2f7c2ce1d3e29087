//! Shared embedded PostgreSQL helpers for integration tests.
//!
//! - One cluster per test binary, shared through `pg-embed-setup-unpriv`.
//! - Under root the library delegates lifecycle steps to the crate's
//!   `pg_worker` binary, located through `PG_EMBEDDED_WORKER`.
//! - Each test gets a fresh database cloned from a template that already has
//!   the embedded Diesel migrations applied, so schemas never drift.

use std::any::Any;
use std::panic;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use backend::outbound::persistence::migrations::MIGRATIONS;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME: &str = "schema_score_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

const WORKER_ENV: &str = "PG_EMBEDDED_WORKER";

/// Returns the process-wide embedded cluster, bootstrapping it on first use.
///
/// Bootstrap failures, including panics raised inside the setup library,
/// come back as `Err` so callers can apply the skip policy.
pub fn shared_cluster_handle() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    ensure_worker_binary();
    panic::catch_unwind(pg_embedded_setup_unpriv::test_support::shared_cluster_handle)
        .map_err(|payload| format!("cluster bootstrap panicked: {}", panic_message(&*payload)))?
        .map_err(|err| format!("cluster bootstrap failed: {err}"))
}

/// Path of the `pg_worker` binary Cargo built for this test run.
pub fn worker_binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_pg_worker")
}

/// Points the setup library at this crate's `pg_worker` unless the caller
/// already chose a worker.
fn ensure_worker_binary() {
    if std::env::var_os(WORKER_ENV).is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var(WORKER_ENV, worker_binary_path());
        }
    }
}

/// Text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// Pins `PG_PASSWORD` so a reused data directory keeps accepting logins.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "schema_score_embedded_test");
        }
    }
}

/// Runs all pending Diesel migrations against `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Creates the migrated template database once per cluster.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<(), String> {
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(TEMPLATE_NAME)
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(TEMPLATE_NAME)
            .map_err(|err| format!("create template: {err:?}"))?;
        migrate_schema(&cluster.connection().database_url(TEMPLATE_NAME))?;
    }
    Ok(())
}

fn provision_attempt(cluster: &ClusterHandle, attempt: usize) -> Result<TemporaryDatabase, String> {
    ensure_template_database(cluster)
        .map_err(|err| format!("attempt {attempt}/{PROVISION_RETRIES}: {err}"))?;
    let name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(name.as_str(), TEMPLATE_NAME)
        .map_err(|err| {
            format!("create database from template: attempt {attempt}/{PROVISION_RETRIES}: {err:?}")
        })
}

/// Provisions a migrated temporary database, retrying transient failures.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("create database from template: exhausted retries");
    for attempt in 1..=PROVISION_RETRIES {
        match provision_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = error,
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}
