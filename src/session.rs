//! Cookie-bound HTTP session against the router's web API
//!
//! Every request made through a [`RouterSession`] shares one private
//! cookie jar, so the session cookie the device sets on login is sent
//! with the follow-up data request. The device also refuses requests
//! that lack a `Referer` pointing at its own base URL.

use crate::error::{Error, Result};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, RequestBuilder, Url};
use std::sync::Arc;
use tracing::debug;

/// Static script holding the firmware feature flags.
pub const CONFIG_PATH: &str = "js/config/config.js";
/// Read-only command endpoint (`cmd=...`).
pub const GET_CMD_PATH: &str = "goform/goform_get_cmd_process";
/// State-changing command endpoint (`goformId=...`).
pub const SET_CMD_PATH: &str = "goform/goform_set_cmd_process";

/// HTTP client and cookie jar for one login + fetch cycle.
///
/// No client-wide timeout is set; callers bound each logical
/// operation themselves.
#[derive(Debug)]
pub struct RouterSession {
    client: Client,
    base_url: String,
}

impl RouterSession {
    /// Create a session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `endpoint` is not a valid URL and
    /// [`Error::Session`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self> {
        let base_url = normalize_base_url(endpoint);
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid endpoint {endpoint:?}: {e}")))?;

        let referer = HeaderValue::from_str(&base_url)
            .map_err(|e| Error::Session(format!("Invalid Referer header: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, referer);

        let client = Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Session(e.to_string()))?;

        debug!("Created router session for {}", base_url);
        Ok(Self { client, base_url })
    }

    /// Base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("GET {}", url);
        self.client.get(url)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("POST {}", url);
        self.client.post(url)
    }
}

/// Append the trailing `/` the device paths are joined onto.
#[must_use]
pub fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Millisecond epoch value for the `_` cache-busting parameter.
pub(crate) fn cache_buster() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
