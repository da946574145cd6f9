use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while resolving configuration at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MongoDB connection string (MONGODB_URI)
    pub uri: String,
    /// Database holding the users/courses/notes/classrooms collections (MONGODB_DB)
    pub name: String,
    pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_request_logging: true,
            max_request_size_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Fails when the connection string or database name is absent; the server
    /// must not start without both.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let environment = match get(&["APP_ENV"]).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let uri = get(&["MONGODB_URI", "MONGO_URI"]).ok_or(ConfigError::Missing("MONGODB_URI"))?;
        let name = get(&["MONGODB_DB", "DB_NAME"]).ok_or(ConfigError::Missing("MONGODB_DB"))?;

        let database = DatabaseConfig {
            uri,
            name,
            app_name: get(&["MONGODB_APP_NAME"]).unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
        };

        let mut api = Self::api_defaults(environment);
        if let Some(v) = get(&["HOST"]) {
            api.host = v;
        }
        if let Some(v) = get(&["PORT"]) {
            api.port = parse_value("PORT", v)?;
        }
        if let Some(v) = get(&["API_ENABLE_REQUEST_LOGGING"]) {
            api.enable_request_logging = parse_value("API_ENABLE_REQUEST_LOGGING", v)?;
        }
        if let Some(v) = get(&["API_MAX_REQUEST_SIZE_BYTES"]) {
            api.max_request_size_bytes = parse_value("API_MAX_REQUEST_SIZE_BYTES", v)?;
        }

        Ok(Self { environment, database, api })
    }

    fn api_defaults(environment: Environment) -> ApiConfig {
        match environment {
            Environment::Development => ApiConfig::default(),
            Environment::Staging => ApiConfig {
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                ..ApiConfig::default()
            },
            Environment::Production => ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                ..ApiConfig::default()
            },
        }
    }
}

/// Parse a set variable, refusing values that don't fit its type
fn parse_value<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { name, value })
}
