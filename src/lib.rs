//! ZTE router SMS client library
//!
//! Reads the SMS inbox of a ZTE LTE router (CPE) through the device's
//! web management API. A single cycle probes the firmware's password
//! hashing scheme, logs in with a session cookie, lists one page of
//! messages and decodes them into [`Message`] values.
//!
//! This is a read-only client: it never sends, deletes or marks
//! messages.

pub mod auth;
mod client;
mod config;
mod error;
mod session;
pub mod sms;

pub use auth::HashMode;
pub use client::{ZteClient, fetch_messages};
pub use config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_LOGIN_TIMEOUT, RouterConfig};
pub use error::{AuthFailure, DecodeError, Error, InvalidParam, LoginStatus, Result};
pub use session::RouterSession;
pub use sms::{Message, RawMessage, SmsQuery};
