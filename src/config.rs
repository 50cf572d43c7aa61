//! Application configuration management.
//!
//! Configuration is read from environment variables (optionally seeded from a
//! `.env` file) with the `envy` crate, which deserializes them into a
//! type-safe struct. Every variable has a default so the service starts with
//! an empty environment against a local PostgreSQL.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `APP_PORT`: HTTP listen port, defaults to 8080
/// - `DATABASE_URL`: full PostgreSQL connection string, overrides `DB_*`
/// - `DB_HOST`, `DB_PORT`, `DB_USERNAME`, `DB_PASSWORD`, `DB_NAME`, `DB_SSLMODE`
/// - `DB_MAX_CONNECTIONS`: pool size, defaults to 5
/// - `LOGGER_LEVEL`: debug, info, warn or error, defaults to info
/// - `LOGGER_FORMAT`: json or text, defaults to json
/// - `SHUTDOWN_GRACE_SECS`: grace period for in-flight requests, defaults to 5
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub app_port: u16,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_db_host")]
    pub db_host: String,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    #[serde(default = "default_db_username")]
    pub db_username: String,

    #[serde(default)]
    pub db_password: String,

    #[serde(default = "default_db_name")]
    pub db_name: String,

    #[serde(default = "default_db_sslmode")]
    pub db_sslmode: String,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_log_level")]
    pub logger_level: String,

    #[serde(default = "default_log_format")]
    pub logger_format: String,

    #[serde(default = "default_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_username() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "subscriptions".to_string()
}

fn default_db_sslmode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_grace_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed into its
    /// expected type (e.g. `APP_PORT=abc`).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Connection options for the datastore.
    ///
    /// `DATABASE_URL` wins when set; otherwise the discrete `DB_*` values are
    /// assembled. Building the options directly avoids escaping passwords
    /// into a URL.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.database_url {
            return PgConnectOptions::from_str(url);
        }

        let ssl_mode = PgSslMode::from_str(&self.db_sslmode)?;

        Ok(PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_username)
            .password(&self.db_password)
            .database(&self.db_name)
            .ssl_mode(ssl_mode))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
