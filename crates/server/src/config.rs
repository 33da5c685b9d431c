//! # Application Configuration
//!
//! This module defines the configuration structure for `sqlgate-server` and
//! the logic for loading it once at startup. Values are layered:
//!
//! 1. Built-in defaults (see the `default_*` functions below).
//! 2. An optional YAML file, `config.yml` in the working directory or the
//!    path named by `SQLGATE_CONFIG`, with `${VAR}` placeholders expanded
//!    from the environment.
//! 3. Environment variables (`PORT`, `DB_HOST`, `DB_PORT`, `DB_USER`,
//!    `DB_PASSWORD`, `DB_NAME`, `API_KEY`, `QUERY_TIMEOUT_MS`).

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use sqlgate::MySqlSettings;
use std::env;
use std::fmt;
use std::fs;
use std::time::Duration;
use tracing::info;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SQLGATE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The resolved server configuration.
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_host")]
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    #[serde(default = "default_db_user")]
    pub db_user: String,
    #[serde(default)]
    pub db_password: String,
    /// Default schema sent with the handshake. Empty means none.
    #[serde(default)]
    pub db_name: String,
    /// The shared bearer token. Empty rejects every request.
    #[serde(default)]
    pub api_key: String,
    /// Optional deadline for connection-open and each operation. Unset or
    /// `0` means no deadline.
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
}

fn default_port() -> u16 {
    8080
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_user() -> String {
    "readonly_user".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_user: default_db_user(),
            db_password: String::new(),
            db_name: String::new(),
            api_key: String::new(),
            query_timeout_ms: None,
        }
    }
}

impl AppConfig {
    pub fn mysql_settings(&self) -> MySqlSettings {
        MySqlSettings {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
        }
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_name", &self.db_name)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("query_timeout_ms", &self.query_timeout_ms)
            .finish_non_exhaustive()
    }
}

// Reads a file and expands `${VAR}` from the environment (unset vars become
// empty). Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration.
///
/// An explicit `config_path_override` must exist; the default locations are
/// optional.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let file_content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => {
            let path =
                env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
            let content = read_and_substitute(&path)?;
            if content.is_some() {
                info!("Loading configuration from '{path}'.");
            }
            content
        }
    };
    if let Some(content) = file_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default().ignore_empty(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}
