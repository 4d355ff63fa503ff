//! Environment configuration
//!
//! Server settings read from environment variables (optionally via `.env`).

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use super::storage::StorageConfig;

/// Server environment
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub log_level: Option<String>,
    pub request_timeout: Duration,
    pub storage: StorageConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 10000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            log_level: None,
            request_timeout: Duration::from_secs(30),
            storage: StorageConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Build from the process environment; every variable is optional
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().with_context(|| "parse PORT")?,
            Err(_) => defaults.port,
        };
        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| "parse REQUEST_TIMEOUT_SECS")?,
            ),
            Err(_) => defaults.request_timeout,
        };
        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port,
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins,
            log_level: env::var("LOG_LEVEL").ok(),
            request_timeout,
            storage: StorageConfig::from_env()?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Address the server binds to
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log level: explicit `LOG_LEVEL`, else debug in development and info elsewhere
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("trace") => tracing::Level::TRACE,
            Some("debug") => tracing::Level::DEBUG,
            Some("info") => tracing::Level::INFO,
            Some("warn") => tracing::Level::WARN,
            Some("error") => tracing::Level::ERROR,
            _ if self.is_development() => tracing::Level::DEBUG,
            _ => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_follows_environment() {
        let mut config = EnvironmentConfig::default();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);

        config.environment = "production".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);

        config.log_level = Some("WARN".to_string());
        assert_eq!(config.tracing_level(), tracing::Level::WARN);
    }

    #[test]
    fn server_url_joins_host_and_port() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.server_url(), "0.0.0.0:10000");
    }
}
