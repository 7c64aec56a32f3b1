//! Test data model for the fake router
//!
//! ```ignore
//! let device = DeviceBuilder::new("admin")
//!     .hash_mode(2)
//!     .nonce("A1B2C3")
//!     .message(sms("1", "+15550001", "Hello", "1"))
//!     .build();
//! ```

use axum::http::StatusCode;
use std::time::Duration;
use zte_sms_client::RawMessage;

/// Session cookie handed out on a successful login.
pub const SESSION_COOKIE: &str = "stok=fake-session-token";

/// Router state and misbehaviours the fake should reproduce.
#[derive(Debug, Clone)]
pub struct Device {
    pub password: String,
    /// `WEB_ATTR_IF_SUPPORT_SHA256` value; `None` leaves it out of
    /// config.js entirely.
    pub hash_mode: Option<u8>,
    pub nonce: String,
    /// Force this `result` code regardless of the password.
    pub login_result: Option<String>,
    /// Answer config.js with this status instead of the script.
    pub config_status: Option<StatusCode>,
    /// Replace the `LD` JSON body verbatim.
    pub ld_body: Option<String>,
    /// Answer the login POST with this status instead of JSON.
    pub login_status: Option<StatusCode>,
    /// Replace the login POST JSON body verbatim.
    pub login_body: Option<String>,
    /// Replace the `sms_data_total` JSON body verbatim.
    pub sms_body: Option<String>,
    pub messages: Vec<RawMessage>,
    /// Delay before answering config.js.
    pub config_delay: Option<Duration>,
    /// Delay before answering the login POST.
    pub login_delay: Option<Duration>,
    pub fetch_delay: Option<Duration>,
}

pub struct DeviceBuilder {
    device: Device,
}

impl DeviceBuilder {
    pub fn new(password: &str) -> Self {
        Self {
            device: Device {
                password: password.to_string(),
                hash_mode: Some(0),
                nonce: "4D3B1F2A".to_string(),
                login_result: None,
                config_status: None,
                ld_body: None,
                login_status: None,
                login_body: None,
                sms_body: None,
                messages: Vec::new(),
                config_delay: None,
                login_delay: None,
                fetch_delay: None,
            },
        }
    }

    pub fn hash_mode(mut self, mode: u8) -> Self {
        self.device.hash_mode = Some(mode);
        self
    }

    pub fn without_hash_mode(mut self) -> Self {
        self.device.hash_mode = None;
        self
    }

    pub fn nonce(mut self, nonce: &str) -> Self {
        self.device.nonce = nonce.to_string();
        self
    }

    pub fn login_result(mut self, code: &str) -> Self {
        self.device.login_result = Some(code.to_string());
        self
    }

    pub fn config_status(mut self, status: StatusCode) -> Self {
        self.device.config_status = Some(status);
        self
    }

    pub fn ld_body(mut self, body: &str) -> Self {
        self.device.ld_body = Some(body.to_string());
        self
    }

    pub fn login_status(mut self, status: StatusCode) -> Self {
        self.device.login_status = Some(status);
        self
    }

    pub fn login_body(mut self, body: &str) -> Self {
        self.device.login_body = Some(body.to_string());
        self
    }

    pub fn sms_body(mut self, body: &str) -> Self {
        self.device.sms_body = Some(body.to_string());
        self
    }

    pub fn message(mut self, raw: RawMessage) -> Self {
        self.device.messages.push(raw);
        self
    }

    pub fn config_delay(mut self, delay: Duration) -> Self {
        self.device.config_delay = Some(delay);
        self
    }

    pub fn login_delay(mut self, delay: Duration) -> Self {
        self.device.login_delay = Some(delay);
        self
    }

    pub fn fetch_delay(mut self, delay: Duration) -> Self {
        self.device.fetch_delay = Some(delay);
        self
    }

    pub fn build(self) -> Device {
        self.device
    }
}

/// A stored SMS as the router would report it.
pub fn sms(id: &str, number: &str, text: &str, tag: &str) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        number: number.to_string(),
        content: text
            .encode_utf16()
            .map(|unit| format!("{unit:04X}"))
            .collect(),
        tag: tag.to_string(),
        date: "24,3,15,8,5,9,+8".to_string(),
        received_all_concat_sms: "1".to_string(),
        concat_sms_total: "1".to_string(),
        concat_sms_received: "1".to_string(),
        sms_class: "4".to_string(),
    }
}
