//! `GET /goform/goform_get_cmd_process`
//!
//! Dispatches on the `cmd` query parameter:
//!
//! - `LD` returns the login nonce: `{"LD":"..."}`, or a canned body
//! - `sms_data_total` returns the stored messages, but only to a client
//!   holding the session cookie. Unauthenticated callers get the
//!   firmware's generic `{"result":"failure"}` rather than an HTTP error.

use super::forbidden;
use crate::fake_router::device::SESSION_COOKIE;
use crate::fake_router::server::RouterState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

pub async fn handle_get_cmd(
    State(state): State<Arc<RouterState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let cmd = params.get("cmd").cloned().unwrap_or_default();
    if !state.record("GET", "/goform/goform_get_cmd_process", params, &headers) {
        return forbidden();
    }

    match cmd.as_str() {
        "LD" => match &state.device.ld_body {
            Some(body) => ([(CONTENT_TYPE, "text/html")], body.clone()).into_response(),
            None => Json(json!({ "LD": state.device.nonce })).into_response(),
        },
        "sms_data_total" => sms_data_total(&state, &headers).await,
        _ => Json(json!({})).into_response(),
    }
}

async fn sms_data_total(state: &RouterState, headers: &HeaderMap) -> Response {
    if let Some(delay) = state.device.fetch_delay {
        tokio::time::sleep(delay).await;
    }

    if !has_session(headers) {
        return Json(json!({ "result": "failure" })).into_response();
    }

    if let Some(body) = &state.device.sms_body {
        return ([(CONTENT_TYPE, "text/html")], body.clone()).into_response();
    }

    Json(json!({ "messages": state.device.messages })).into_response()
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == SESSION_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("lang=en; stok=fake-session-token"),
        );
        assert!(has_session(&headers));
    }

    #[test]
    fn no_cookie_no_session() {
        assert!(!has_session(&HeaderMap::new()));
    }
}
