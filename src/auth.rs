//! Router login
//!
//! Firmware revisions disagree on how the login password is hashed.
//! The scheme in use is advertised by the `WEB_ATTR_IF_SUPPORT_SHA256`
//! flag in the device's `config.js`, which is read fresh on every
//! login:
//!
//! | flag | digest sent as `password`                              |
//! |------|--------------------------------------------------------|
//! | `0`  | `base64(password)`                                     |
//! | `1`  | `HEX(SHA256(base64(password)))`                        |
//! | `2`  | `HEX(SHA256(HEX(SHA256(password)) + LD))`              |
//!
//! `HEX` is uppercase hexadecimal and `LD` is a one-time nonce issued
//! by the device.

use crate::error::{AuthFailure, Error, LoginStatus, Result};
use crate::session::{CONFIG_PATH, GET_CMD_PATH, RouterSession, SET_CMD_PATH, cache_buster};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info};

/// Name of the `config.js` entry selecting the password digest.
pub const HASH_MODE_SETTING: &str = "WEB_ATTR_IF_SUPPORT_SHA256";

/// Password digest scheme expected by the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashMode {
    /// Flag `0`: the password is only base64 encoded.
    Base64,
    /// Flag `1`: SHA-256 over the base64 encoded password.
    Sha256,
    /// Flag `2`: double SHA-256 salted with the `LD` nonce.
    SaltedSha256,
}

impl HashMode {
    /// The flag value as it appears in `config.js`.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Base64 => 0,
            Self::Sha256 => 1,
            Self::SaltedSha256 => 2,
        }
    }

    /// Whether a login nonce must be fetched before hashing.
    #[must_use]
    pub const fn needs_nonce(self) -> bool {
        matches!(self, Self::SaltedSha256)
    }
}

impl TryFrom<u8> for HashMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Base64),
            1 => Ok(Self::Sha256),
            2 => Ok(Self::SaltedSha256),
            other => Err(Error::UnsupportedHashMode(other)),
        }
    }
}

/// Compute the `password` form value for a login.
///
/// `nonce` is only mixed in for [`HashMode::SaltedSha256`].
#[must_use]
pub fn login_digest(mode: HashMode, password: &str, nonce: &str) -> String {
    match mode {
        HashMode::Base64 => STANDARD.encode(password),
        HashMode::Sha256 => sha256_hex(&STANDARD.encode(password)),
        HashMode::SaltedSha256 => sha256_hex(&format!("{}{nonce}", sha256_hex(password))),
    }
}

fn sha256_hex(input: &str) -> String {
    hex::encode_upper(Sha256::digest(input.as_bytes()))
}

/// Find a single-digit `name: N,` entry in a `config.js` body.
///
/// # Errors
///
/// Returns [`Error::ConfigParse`] if the entry is absent.
pub fn extract_numeric_setting(body: &str, name: &str) -> Result<u8> {
    let pattern = format!(r"{}\s*:\s*(\d),", regex::escape(name));
    let re = Regex::new(&pattern).map_err(|e| Error::ConfigParse(e.to_string()))?;

    re.captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::ConfigParse(format!("failed to find config {name}")))
}

/// Read the password digest scheme from the device's `config.js`.
///
/// # Errors
///
/// Returns [`Error::ConfigFetch`] if the script cannot be downloaded,
/// [`Error::ConfigParse`] if the flag is missing, and
/// [`Error::UnsupportedHashMode`] for a flag outside `0..=2`.
pub async fn probe_hash_mode(session: &RouterSession) -> Result<HashMode> {
    let resp = session
        .get(CONFIG_PATH)
        .send()
        .await
        .map_err(|e| Error::ConfigFetch(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::ConfigFetch(format!(
            "config.js returned status {status}"
        )));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| Error::ConfigFetch(format!("failed to read config.js: {e}")))?;

    let flag = extract_numeric_setting(&body, HASH_MODE_SETTING)?;
    debug!("{} = {}", HASH_MODE_SETTING, flag);
    HashMode::try_from(flag)
}

#[derive(Deserialize)]
struct NonceResponse {
    #[serde(rename = "LD")]
    ld: Option<String>,
}

/// Fetch the one-time `LD` nonce used by [`HashMode::SaltedSha256`].
///
/// # Errors
///
/// Returns [`Error::NonceFetch`] if the request fails, the body is not
/// JSON, or the nonce is missing or empty.
pub async fn fetch_nonce(session: &RouterSession) -> Result<String> {
    let ts = cache_buster();
    let resp = session
        .get(GET_CMD_PATH)
        .query(&[("isTest", "false"), ("cmd", "LD"), ("_", ts.as_str())])
        .send()
        .await
        .map_err(|e| Error::NonceFetch(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::NonceFetch(format!(
            "LD request returned status {status}"
        )));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| Error::NonceFetch(e.to_string()))?;
    let parsed: NonceResponse = serde_json::from_str(&body)
        .map_err(|e| Error::NonceFetch(format!("failed to decode LD response: {e}")))?;

    parsed
        .ld
        .filter(|ld| !ld.is_empty())
        .ok_or_else(|| Error::NonceFetch("LD is empty".into()))
}

#[derive(Deserialize)]
struct LoginResponse {
    result: String,
}

/// Authenticate the session with the device.
///
/// Probes the digest scheme, fetches a nonce when the scheme needs one,
/// then posts the login form. On success the device's session cookie
/// is held by `session`.
///
/// The three requests share one `limit`. Whichever step is in flight
/// when it runs out reports the overrun as its own error.
///
/// # Errors
///
/// Propagates probe and nonce errors unchanged. Transport failures,
/// undecodable responses and non-zero `result` codes are returned as
/// [`Error::Authentication`]; an overrun during the login POST is
/// [`AuthFailure::Timeout`].
pub async fn login(session: &RouterSession, password: &str, limit: Duration) -> Result<()> {
    let deadline = Instant::now() + limit;
    let elapsed = || format!("timed out after {limit:?}");

    let mode = timeout_at(deadline, probe_hash_mode(session))
        .await
        .map_err(|_| Error::ConfigFetch(elapsed()))??;
    let nonce = if mode.needs_nonce() {
        timeout_at(deadline, fetch_nonce(session))
            .await
            .map_err(|_| Error::NonceFetch(elapsed()))??
    } else {
        String::new()
    };

    let digest = login_digest(mode, password, &nonce);
    timeout_at(deadline, submit_login(session, &digest))
        .await
        .map_err(|_| Error::Authentication(AuthFailure::Timeout(limit)))??;

    info!("Logged in to router (hash mode {})", mode.code());
    Ok(())
}

async fn submit_login(session: &RouterSession, digest: &str) -> Result<()> {
    let transport = |msg: String| Error::Authentication(AuthFailure::Transport(msg));

    let resp = session
        .post(SET_CMD_PATH)
        .form(&[("isTest", "false"), ("goformId", "LOGIN"), ("password", digest)])
        .send()
        .await
        .map_err(|e| transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(transport(format!("login request returned status {status}")));
    }

    let body = resp.text().await.map_err(|e| transport(e.to_string()))?;
    let parsed: LoginResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Authentication(AuthFailure::Decode(e.to_string())))?;

    match LoginStatus::from_code(&parsed.result) {
        LoginStatus::Ok => Ok(()),
        status => Err(Error::Authentication(AuthFailure::Status(status))),
    }
}
