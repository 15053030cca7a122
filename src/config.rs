use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_ENV: &str = "production";
const DEFAULT_STORAGE_PATH: &str = "storage/storage.db";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required configuration value {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("cannot read configuration file {path}: {reason}")]
    File { path: String, reason: String },
}

/// YAML file named by `CONFIG_PATH`. Every field is optional; environment
/// variables take precedence over it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    env: Option<String>,
    storage_path: Option<String>,
    http_server: FileHttpServer,
    jwt_secret: Option<String>,
    admin: FileAdmin,
    shutdown_grace_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileHttpServer {
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileAdmin {
    email: Option<String>,
    password: Option<String>,
}

impl FileConfig {
    fn read(path: &str) -> Result<Self, ConfigError> {
        let file_error = |reason: String| ConfigError::File {
            path: path.to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        serde_yaml::from_str(&raw).map_err(|e| file_error(e.to_string()))
    }

    /// Value under the environment variable name it stands in for
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "APP_ENV" => self.env.clone(),
            "STORAGE_PATH" => self.storage_path.clone(),
            "HTTP_ADDR" => self.http_server.address.clone(),
            "JWT_SECRET" => self.jwt_secret.clone(),
            "ADMIN_EMAIL" => self.admin.email.clone(),
            "ADMIN_PASSWORD" => self.admin.password.clone(),
            "SHUTDOWN_GRACE_SECS" => self.shutdown_grace_secs.map(|secs| secs.to_string()),
            _ => None,
        }
    }
}

/// Administrator login, compared verbatim at login time.
#[derive(Clone, Debug, PartialEq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Process-wide configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: String,
    pub storage_path: String,
    pub http_addr: String,
    pub jwt_secret: String,
    pub admin: AdminCredentials,
    pub shutdown_grace: Duration,
}

impl AppConfig {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup. When `CONFIG_PATH`
    /// is set, the YAML file it names fills in keys the lookup lacks.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |value: &String| !value.trim().is_empty();
        let file = match lookup("CONFIG_PATH").filter(present) {
            Some(path) => {
                let file = FileConfig::read(&path)?;
                info!(path = %path, "Configuration file loaded");
                file
            }
            None => FileConfig::default(),
        };

        let optional = |key: &str| {
            lookup(key)
                .filter(present)
                .or_else(|| file.get(key).filter(present))
        };
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let shutdown_grace = match optional("SHUTDOWN_GRACE_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    key: "SHUTDOWN_GRACE_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        };

        let config = Self {
            env: optional("APP_ENV").unwrap_or_else(|| DEFAULT_ENV.to_string()),
            storage_path: optional("STORAGE_PATH")
                .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
            http_addr: optional("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            jwt_secret: required("JWT_SECRET")?,
            admin: AdminCredentials {
                email: required("ADMIN_EMAIL")?,
                password: required("ADMIN_PASSWORD")?,
            },
            shutdown_grace,
        };

        if config.env == DEFAULT_ENV {
            // The session cookie is sent without the Secure attribute.
            warn!("Running in production mode; serve behind TLS termination");
        }

        debug!(
            env = %config.env,
            storage_path = %config.storage_path,
            http_addr = %config.http_addr,
            shutdown_grace_secs = config.shutdown_grace.as_secs(),
            "Configuration loaded"
        );

        Ok(config)
    }
}
