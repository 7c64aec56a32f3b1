//! ZTE router SMS client

use crate::auth;
use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::session::{GET_CMD_PATH, RouterSession, cache_buster};
use crate::sms::{Message, RawMessage, SmsQuery, decode_batch};
use serde::Deserialize;
use tokio::time::timeout;
use tracing::info;

/// Read-only SMS client for one login + fetch cycle.
///
/// Each client owns its own cookie jar. Create a new one per caller
/// rather than sharing a logged-in client between credentials.
pub struct ZteClient {
    config: RouterConfig,
    session: RouterSession,
}

#[derive(Deserialize)]
struct MessageList {
    messages: Option<Vec<RawMessage>>,
}

impl ZteClient {
    /// Create a client with a fresh, unauthenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: RouterConfig) -> Result<Self> {
        let session = RouterSession::new(&config.endpoint)?;
        Ok(Self { config, session })
    }

    #[must_use]
    pub const fn session(&self) -> &RouterSession {
        &self.session
    }

    /// Log in with the configured password.
    ///
    /// The config probe, optional nonce fetch and login POST share the
    /// `login_timeout` budget.
    ///
    /// # Errors
    ///
    /// Returns probe, nonce and authentication errors. Running out of
    /// budget is reported by the step that was waiting; see
    /// [`auth::login`].
    pub async fn login(&self) -> Result<()> {
        auth::login(
            &self.session,
            &self.config.password,
            self.config.login_timeout,
        )
        .await
    }

    /// Fetch one page of messages without decoding them.
    ///
    /// Must follow a successful [`login`](Self::login) on the same
    /// client; otherwise the device answers with its own error or an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] on transport failure, a non-success
    /// status, an undecodable body, or when `fetch_timeout` elapses.
    pub async fn list_raw_messages(&self, query: SmsQuery) -> Result<Vec<RawMessage>> {
        let limit = self.config.fetch_timeout;
        timeout(limit, self.request_messages(query))
            .await
            .map_err(|_| Error::Fetch(format!("timed out after {limit:?}")))?
    }

    /// Fetch and decode one page of messages.
    ///
    /// Records whose id or content cannot be decoded are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// See [`list_raw_messages`](Self::list_raw_messages).
    pub async fn list_messages(&self, query: SmsQuery) -> Result<Vec<Message>> {
        let raws = self.list_raw_messages(query).await?;
        let messages = decode_batch(&raws);

        info!(
            "Fetched {} messages ({} dropped)",
            messages.len(),
            raws.len() - messages.len()
        );
        Ok(messages)
    }

    async fn request_messages(&self, query: SmsQuery) -> Result<Vec<RawMessage>> {
        let page = query.page.to_string();
        let per_page = query.per_page.to_string();
        let mem_store = query.mem_store.to_string();
        let tag = query.tag.to_string();
        let ts = cache_buster();

        let resp = self
            .session
            .get(GET_CMD_PATH)
            .query(&[
                ("isTest", "false"),
                ("cmd", "sms_data_total"),
                ("page", page.as_str()),
                ("data_per_page", per_page.as_str()),
                ("mem_store", mem_store.as_str()),
                ("tags", tag.as_str()),
                ("order_by", "order by id desc"),
                ("_", ts.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "sms_data_total returned status {status}"
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        let list: MessageList = serde_json::from_str(&body)
            .map_err(|e| Error::Fetch(format!("failed to decode message list: {e}")))?;

        Ok(list.messages.unwrap_or_default())
    }
}

/// Log in and fetch one page of messages with a fresh session.
///
/// Nothing is returned unless both steps succeed.
///
/// # Errors
///
/// Returns the first configuration, authentication or fetch error.
pub async fn fetch_messages(config: RouterConfig, query: SmsQuery) -> Result<Vec<Message>> {
    let client = ZteClient::new(config)?;
    client.login().await?;
    client.list_messages(query).await
}
