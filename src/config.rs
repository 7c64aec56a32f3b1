//! Router connection configuration

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

/// Deadline shared by config probe, nonce fetch and login POST.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for the message listing call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for a ZTE router's web API
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Base URL of the device, e.g. `http://192.168.0.1/`
    pub endpoint: String,
    pub password: String,
    pub login_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl RouterConfig {
    /// Configuration with the default deadlines.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            password: password.into(),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Load router configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `ENDPOINT`
    /// - `PASSWORD`
    ///
    /// Optional (with defaults):
    /// - `LOGIN_TIMEOUT_SECS` (default: `10`)
    /// - `FETCH_TIMEOUT_SECS` (default: `15`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or
    /// empty, or if a timeout is not a positive integer.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            endpoint: required("ENDPOINT")?,
            password: required("PASSWORD")?,
            login_timeout: timeout_secs("LOGIN_TIMEOUT_SECS", DEFAULT_LOGIN_TIMEOUT)?,
            fetch_timeout: timeout_secs("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT)?,
        })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} not set"))),
    }
}

fn timeout_secs(name: &str, default: Duration) -> Result<Duration> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    parse_timeout(name, &raw)
}

fn parse_timeout(name: &str, raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config(format!("{name} must be positive"))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(Error::Config(format!("Invalid {name}: {e}"))),
    }
}
