//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! The store URL may embed credentials, so it is wrapped in
//! secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::error::{Error, Result};
use crate::queue::DEFAULT_TTL;
use secrecy::SecretString;
use std::time::Duration;

#[derive(Debug)]
pub struct Config {
    pub redis_url: SecretString,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    /// Lifetime of queue keys, refreshed on every backlog append.
    pub queue_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            redis_url: SecretString::from(required_var("REDIS_URL")?),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            queue_ttl: queue_ttl_var("QUEUE_TTL_SECS")?,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn queue_ttl_var(name: &str) -> Result<Duration> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(DEFAULT_TTL);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::Config(format!(
            "{name} must be a positive number of seconds, got {raw:?}"
        ))),
    }
}
