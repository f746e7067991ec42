//! Server configuration from the environment

use serde::Serialize;
use std::net::IpAddr;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid API_HOST value: {0}")]
    InvalidHost(String),
    #[error("Invalid API_PORT value: {0}")]
    InvalidPort(String),
    #[error("Invalid LOG_LEVEL value: {0}")]
    InvalidLogLevel(String),
    #[error("RATE_LIMIT must be a positive integer, got {0}")]
    InvalidRateLimit(String),
}

/// Configuration for the HTTP server and the agent
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub api_host: String,
    pub api_port: u16,
    pub log_level: String,
    /// Requests per minute per client IP
    pub rate_limit: u32,
    /// Accepted `X-API-Key`; any non-empty key when unset
    #[serde(skip)]
    pub api_key: Option<String>,
    pub db_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            log_level: "info".to_string(),
            rate_limit: 100,
            api_key: None,
            db_path: default_db_path(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source, validating as we go
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_port = match lookup("API_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(raw))?,
            None => defaults.api_port,
        };

        let rate_limit = match lookup("RATE_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|r| *r > 0)
                .ok_or(ConfigError::InvalidRateLimit(raw))?,
            None => defaults.rate_limit,
        };

        let config = Self {
            api_host: lookup("API_HOST").unwrap_or(defaults.api_host),
            api_port,
            log_level: lookup("LOG_LEVEL")
                .map(|l| l.trim().to_lowercase())
                .unwrap_or(defaults.log_level),
            rate_limit,
            api_key: lookup("API_KEY").filter(|k| !k.trim().is_empty()),
            db_path: lookup("AGENT_DB_PATH").unwrap_or(defaults.db_path),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidHost(self.api_host.clone()));
        }
        if self.api_port == 0 {
            return Err(ConfigError::InvalidPort(self.api_port.to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        if self.rate_limit == 0 {
            return Err(ConfigError::InvalidRateLimit(self.rate_limit.to_string()));
        }
        Ok(())
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> String {
        format!("agentic_qa={},tower_http=debug", self.log_level)
    }
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    format!("{home}/.agentic-qa/memory.db")
}
