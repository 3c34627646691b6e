//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

pub const DEFAULT_RECOMMENDATION_MODEL: &str = "gpt-3.5-turbo-0301";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub recommendation_model: String,
    pub session_ttl_days: i64,
    pub secure_cookies: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so parsing can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load the chat-completion credential (as optional) ---
        let api_key = lookup("API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        let api_base = lookup("OPENAI_API_BASE");
        let recommendation_model =
            lookup("RECOMMENDATION_MODEL").unwrap_or_else(|| DEFAULT_RECOMMENDATION_MODEL.to_string());

        // --- Load Session Settings ---
        let session_ttl_days = match lookup("SESSION_TTL_DAYS") {
            Some(value) => match value.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_TTL_DAYS".to_string(),
                        format!("'{}' is not a positive number of days", value),
                    ))
                }
            },
            None => 30,
        };

        let secure_cookies = match lookup("SECURE_COOKIES") {
            Some(value) => value.parse::<bool>().map_err(|e| {
                ConfigError::InvalidValue("SECURE_COOKIES".to_string(), e.to_string())
            })?,
            None => false,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            api_key,
            api_base,
            recommendation_model,
            session_ttl_days,
            secure_cookies,
        })
    }
}
