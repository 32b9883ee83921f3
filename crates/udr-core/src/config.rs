//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub generator: GeneratorConfig,
    pub reports: ReportsConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma-separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// Where call records live
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// PostgreSQL via `database.url`
    Postgres,
}

/// Storage selection
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, required for the postgres backend
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Synthetic CDR generation settings
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// Size of the subscriber pool
    #[serde(default = "default_subscriber_count")]
    pub subscriber_count: usize,

    /// Exclusive upper bound of calls generated per day
    #[serde(default = "default_max_calls_per_day")]
    pub max_calls_per_day: u32,

    /// Months of traffic per generation run
    #[serde(default = "default_months")]
    pub months: u32,

    /// Shortest call in seconds
    #[serde(default = "default_min_call_secs")]
    pub min_call_secs: u32,

    /// Exclusive upper bound of call length in seconds
    #[serde(default = "default_max_call_secs")]
    pub max_call_secs: u32,

    /// Records per insert batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Wipe and regenerate the store when the server starts
    #[serde(default = "default_regenerate_on_startup")]
    pub regenerate_on_startup: bool,
}

fn default_subscriber_count() -> usize {
    21
}

fn default_max_calls_per_day() -> u32 {
    21
}

fn default_months() -> u32 {
    12
}

fn default_min_call_secs() -> u32 {
    30
}

fn default_max_call_secs() -> u32 {
    600
}

fn default_batch_size() -> usize {
    500
}

fn default_regenerate_on_startup() -> bool {
    true
}

/// CDR report export settings
#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory the CSV reports are written to
    #[serde(default = "default_reports_dir")]
    pub directory: String,
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

fn env_source() -> Environment {
    Environment::with_prefix("UDR")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    ///
    /// Later sources win: built-in defaults, `config/default`,
    /// `config/{RUN_MODE}`, then `UDR__`-prefixed environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::layered(&run_mode, env_source())
    }

    fn layered(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("storage.backend", "memory")?
            .set_default("database.max_connections", 10)?
            .set_default("generator.subscriber_count", 21)?
            .set_default("generator.max_calls_per_day", 21)?
            .set_default("generator.months", 12)?
            .set_default("generator.min_call_secs", 30)?
            .set_default("generator.max_call_secs", 600)?
            .set_default("generator.batch_size", 500)?
            .set_default("generator.regenerate_on_startup", true)?
            .set_default("reports.directory", "reports")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with the UDR__ prefix
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    /// Allowed CORS origins, trimmed, empty entries dropped
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            subscriber_count: default_subscriber_count(),
            max_calls_per_day: default_max_calls_per_day(),
            months: default_months(),
            min_call_secs: default_min_call_secs(),
            max_call_secs: default_max_call_secs(),
            batch_size: default_batch_size(),
            regenerate_on_startup: default_regenerate_on_startup(),
        }
    }
}
