use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::sources::greenhouse::DEFAULT_API_BASE;

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => bail!("LOG_LEVEL must be one of DEBUG, INFO, WARN, ERROR (got '{other}')"),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub log_level: LogLevel,
    pub sources_path: String,
    /// Minimum spacing between two requests to the same upstream host.
    pub courtesy_delay: Duration,
    pub fetch_timeout: Duration,
    pub fetch_max_retries: u32,
    pub greenhouse_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let courtesy_delay_ms: u64 = var("COURTESY_DELAY_MS", "3000")
            .parse()
            .context("COURTESY_DELAY_MS must be a whole number of milliseconds")?;
        if courtesy_delay_ms == 0 {
            bail!("COURTESY_DELAY_MS must be greater than zero");
        }

        let fetch_timeout_secs: u64 = var("FETCH_TIMEOUT_SECS", "10")
            .parse()
            .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?;
        if fetch_timeout_secs == 0 {
            bail!("FETCH_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .context("Required environment variable 'DATABASE_URL' is not set")?,
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            log_level: LogLevel::parse(&var("LOG_LEVEL", "INFO"))?,
            sources_path: var("SOURCES_PATH", "config/sources.json"),
            courtesy_delay: Duration::from_millis(courtesy_delay_ms),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            fetch_max_retries: var("FETCH_MAX_RETRIES", "2")
                .parse()
                .context("FETCH_MAX_RETRIES must be a non-negative integer")?,
            greenhouse_api_base: var("GREENHOUSE_API_BASE", DEFAULT_API_BASE),
        })
    }
}
