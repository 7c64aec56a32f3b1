//! Error types for zte-sms-client

use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session setup failed: {0}")]
    Session(String),

    #[error("Failed to fetch device config: {0}")]
    ConfigFetch(String),

    #[error("Failed to parse device config: {0}")]
    ConfigParse(String),

    #[error("Failed to fetch login nonce: {0}")]
    NonceFetch(String),

    #[error("Unsupported WEB_ATTR_IF_SUPPORT_SHA256: {0}")]
    UnsupportedHashMode(u8),

    #[error("Authentication failed: {0}")]
    Authentication(AuthFailure),

    #[error("Failed to fetch messages: {0}")]
    Fetch(String),
}

impl Error {
    /// Whether the error happened before or during the login call.
    ///
    /// The HTTP front-end reports all of these as an authentication
    /// failure.
    #[must_use]
    pub const fn is_login_phase(&self) -> bool {
        matches!(
            self,
            Self::ConfigFetch(_)
                | Self::ConfigParse(_)
                | Self::NonceFetch(_)
                | Self::UnsupportedHashMode(_)
                | Self::Authentication(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a login attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The device answered with a non-zero `result` code.
    Status(LoginStatus),
    /// The request never produced a usable response.
    Transport(String),
    /// The response body was not the expected JSON object.
    Decode(String),
    /// The login POST was still pending when the login deadline passed.
    Timeout(Duration),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => f.write_str(status.message()),
            Self::Transport(msg) => write!(f, "login request failed: {msg}"),
            Self::Decode(msg) => write!(f, "invalid login response: {msg}"),
            Self::Timeout(limit) => write!(f, "login timed out after {limit:?}"),
        }
    }
}

/// Login `result` code reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Ok,
    Failed,
    DuplicateUser,
    BadPassword,
    Unknown(String),
}

impl LoginStatus {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::Ok,
            "1" => Self::Failed,
            "2" => Self::DuplicateUser,
            "3" => Self::BadPassword,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Human-readable message matching the device web UI.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Ok => "Login OK",
            Self::Failed => "Login Fail",
            Self::DuplicateUser => "Duplicate User",
            Self::BadPassword => "Bad Password",
            Self::Unknown(_) => "Unknown error",
        }
    }
}

/// Per-record decoding failure. The record is dropped, the batch is not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid ID {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("failed to decode content hex: {0}")]
    InvalidContent(String),
}

/// A listing parameter that is not a number or is out of range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid '{0}' parameter")]
pub struct InvalidParam(pub &'static str);
