//! In-process fake router
//!
//! The real device exposes three paths that matter for reading SMS:
//!
//! ```text
//!   GET  /js/config/config.js              firmware flags (hash mode)
//!   GET  /goform/goform_get_cmd_process    ?cmd=LD | ?cmd=sms_data_total
//!   POST /goform/goform_set_cmd_process    goformId=LOGIN
//! ```
//!
//! Requests without a `Referer` header are refused with 403, as the
//! firmware does. Every request is logged so tests can inspect what
//! the client actually sent.

use super::device::Device;
use super::handlers::{handle_config, handle_get_cmd, handle_set_cmd};
use axum::Router;
use axum::http::{HeaderMap, HeaderName};
use axum::http::header::{COOKIE, REFERER};
use axum::routing::{get, post};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One request as seen by the fake router.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: &'static str,
    /// Query parameters, or form fields for POST.
    pub params: HashMap<String, String>,
    pub referer: Option<String>,
    pub cookie: Option<String>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

pub struct RouterState {
    pub device: Device,
    log: Mutex<Vec<RecordedRequest>>,
}

impl RouterState {
    /// Log a request; returns `false` if it must be refused for a
    /// missing Referer.
    pub fn record(
        &self,
        method: &'static str,
        path: &'static str,
        params: HashMap<String, String>,
        headers: &HeaderMap,
    ) -> bool {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let referer = header(REFERER);
        let accepted = referer.is_some();

        self.log.lock().unwrap().push(RecordedRequest {
            method,
            path,
            params,
            referer,
            cookie: header(COOKIE),
        });
        accepted
    }
}

/// A fake router on `127.0.0.1` with an OS-assigned port.
pub struct FakeRouter {
    port: u16,
    state: Arc<RouterState>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeRouter {
    /// Start serving `device` in a background task.
    pub async fn start(device: Device) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to ephemeral port");
        let port = listener.local_addr().unwrap().port();

        let state = Arc::new(RouterState {
            device,
            log: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/js/config/config.js", get(handle_config))
            .route("/goform/goform_get_cmd_process", get(handle_get_cmd))
            .route("/goform/goform_set_cmd_process", post(handle_set_cmd))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            port,
            state,
            handle,
        }
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Endpoint without a trailing slash, as a user would configure it.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Snapshot of all requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.log.lock().unwrap().clone()
    }

    /// Requests whose `cmd` (GET) or `goformId` (POST) equals `command`.
    pub fn requests_for(&self, command: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.param("cmd") == Some(command) || r.param("goformId") == Some(command))
            .collect()
    }
}

impl Drop for FakeRouter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
