//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SCHEMA_SCORE_*` environment variables, and
//! configuration files, in OrthoConfig's usual precedence. The database URL
//! additionally honours the conventional `DATABASE_URL` and `DB_*` variables
//! used by deployment tooling.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: &str = "5432";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "postgres";
const DEFAULT_DB_NAME: &str = "schema_score";
const DEFAULT_DB_SSLMODE: &str = "disable";

/// Process-level configuration for the report server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCHEMA_SCORE")]
pub struct ServerSettings {
    /// Interface to bind, default `0.0.0.0`.
    pub host: Option<String>,
    /// TCP port to bind, default 8080.
    pub port: Option<u16>,
    /// Full PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Hard cap on open pool connections.
    pub db_max_connections: Option<u32>,
    /// Idle connections the pool keeps warm.
    pub db_min_idle: Option<u32>,
    /// Seconds after which a pooled connection is recycled.
    pub db_max_lifetime_secs: Option<u64>,
    /// Seconds a checkout may wait for a free connection.
    pub db_connection_timeout_secs: Option<u64>,
    /// Apply pending migrations before serving, default `true`.
    pub run_migrations: Option<bool>,
    /// Allow cross-origin requests from any origin on `/api`, default `true`.
    pub cors_allow_any_origin: Option<bool>,
}

impl ServerSettings {
    /// Whether pending migrations run at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Whether `/api` accepts cross-origin requests from any origin.
    pub fn cors_allow_any_origin(&self) -> bool {
        self.cors_allow_any_origin.unwrap_or(true)
    }

    /// Socket address assembled from `host` and `port`.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the host is not a valid IP address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        format!("{host}:{port}")
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid bind address {host}: {err}")))
    }

    /// Resolve the database URL from the process environment.
    pub fn database_url(&self) -> String {
        self.database_url_from(|key| std::env::var(key).ok())
    }

    /// Resolve the database URL using `lookup` for environment fallbacks.
    ///
    /// Precedence: the `database_url` setting, then `DATABASE_URL`, then a
    /// URL assembled from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`,
    /// `DB_NAME`, and `DB_SSLMODE`.
    pub fn database_url_from(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = self
            .database_url
            .clone()
            .filter(|value| !value.trim().is_empty())
        {
            return url;
        }
        if let Some(url) = non_empty("DATABASE_URL") {
            return url;
        }
        let part = |key: &str, default: &str| non_empty(key).unwrap_or_else(|| default.to_owned());
        format!(
            "postgres://{user}:{password}@{host}:{port}/{name}?sslmode={sslmode}",
            user = part("DB_USER", DEFAULT_DB_USER),
            password = part("DB_PASSWORD", DEFAULT_DB_PASSWORD),
            host = part("DB_HOST", DEFAULT_DB_HOST),
            port = part("DB_PORT", DEFAULT_DB_PORT),
            name = part("DB_NAME", DEFAULT_DB_NAME),
            sslmode = part("DB_SSLMODE", DEFAULT_DB_SSLMODE),
        )
    }

    /// Pool configuration for `database_url` with any overrides applied.
    pub fn pool_config(&self, database_url: &str) -> PoolConfig {
        let mut config = PoolConfig::new(database_url);
        if let Some(max_size) = self.db_max_connections {
            config = config.with_max_size(max_size);
        }
        if let Some(min_idle) = self.db_min_idle {
            config = config.with_min_idle(Some(min_idle));
        }
        if let Some(secs) = self.db_max_lifetime_secs {
            let lifetime = Duration::from_secs(secs);
            config = config
                .with_max_lifetime(Some(lifetime))
                .with_idle_timeout(Some(lifetime));
        }
        if let Some(secs) = self.db_connection_timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }
        config
    }
}
