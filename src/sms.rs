//! SMS records as stored on the router
//!
//! The device reports every field as a string: numbers in decimal,
//! flags as `"0"`/`"1"`, the body as hex-encoded UTF-16BE and the
//! timestamp as comma separated components. [`RawMessage`] mirrors that
//! wire shape; [`decode`] is the single place where it is turned into a
//! typed [`Message`].

use crate::error::{DecodeError, InvalidParam};
use chrono::{
    DateTime, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// An SMS exactly as the device returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMessage {
    pub id: String,
    pub number: String,
    pub content: String,
    pub tag: String,
    pub date: String,
    pub received_all_concat_sms: String,
    pub concat_sms_total: String,
    pub concat_sms_received: String,
    pub sms_class: String,
}

/// A decoded SMS.
///
/// Serializes with the device's field names so JSON consumers see the
/// same keys the router uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: u64,
    #[serde(rename = "number")]
    pub sender: String,
    #[serde(rename = "content")]
    pub body: String,
    pub tag: String,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Local>,
    #[serde(rename = "received_all_concat_sms")]
    pub is_complete: bool,
    #[serde(rename = "concat_sms_total")]
    pub part_count: u32,
    #[serde(rename = "concat_sms_received")]
    pub parts_received: u32,
    #[serde(rename = "sms_class")]
    pub message_class: u32,
    /// `false` only for tag `"1"` (unread).
    pub read: bool,
}

/// Decode a raw record, using the current time for unresolvable dates.
///
/// # Errors
///
/// Fails if `id` is not a non-negative integer or `content` is not
/// valid hex. Every other field falls back to a zero value.
pub fn decode(raw: &RawMessage) -> Result<Message, DecodeError> {
    decode_at(raw, Local::now())
}

/// Like [`decode`], with `now` standing in for the wall clock.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_at(raw: &RawMessage, now: DateTime<Local>) -> Result<Message, DecodeError> {
    let id = raw.id.parse::<u64>().map_err(|e| DecodeError::InvalidId {
        id: raw.id.clone(),
        reason: e.to_string(),
    })?;
    let body = decode_content(&raw.content)?;

    Ok(Message {
        id,
        sender: raw.number.clone(),
        body,
        tag: raw.tag.clone(),
        timestamp: parse_timestamp(&raw.date, now),
        is_complete: raw.received_all_concat_sms == "1",
        part_count: raw.concat_sms_total.parse().unwrap_or(0),
        parts_received: raw.concat_sms_received.parse().unwrap_or(0),
        message_class: raw.sms_class.parse().unwrap_or(0),
        read: raw.tag != "1",
    })
}

/// Decode a fetched batch, dropping (and logging) undecodable records.
#[must_use]
pub fn decode_batch(raws: &[RawMessage]) -> Vec<Message> {
    let now = Local::now();
    raws.iter()
        .filter_map(|raw| match decode_at(raw, now) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!("Error parsing SMS ID {}: {}", raw.id, e);
                None
            }
        })
        .collect()
}

/// Hex string of UTF-16BE code units to text.
///
/// A dangling odd byte is ignored and unpaired surrogates become
/// U+FFFD.
fn decode_content(hex_content: &str) -> Result<String, DecodeError> {
    let bytes =
        hex::decode(hex_content).map_err(|e| DecodeError::InvalidContent(e.to_string()))?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// `yy,MM,dd,hh,mm,ss[,...]` in device-local time.
///
/// Unparsable components count as zero and out-of-range ones carry
/// into the next larger unit, so month `0` is December of the previous
/// year and hour `-1` is 23:00 the day before. Fewer than six
/// components, or a wall time skipped by a DST change, yields `now`.
fn parse_timestamp(raw: &str, now: DateTime<Local>) -> DateTime<Local> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() < 6 {
        return now;
    }

    let field = |i: usize| parts[i].parse::<i64>().unwrap_or(0);
    let components = [field(0), field(1), field(2), field(3), field(4), field(5)];

    normalized_datetime(components)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or(now)
}

/// Build a date from possibly out-of-range components, letting each
/// overflow roll into the next unit.
fn normalized_datetime(components: [i64; 6]) -> Option<NaiveDateTime> {
    let [yy, month, day, hour, minute, second] = components;
    let year = i32::try_from(yy.checked_add(2000)?).ok()?;
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;

    let months = month.checked_sub(1)?;
    let shift = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    let date = if months >= 0 {
        first.checked_add_months(shift)?
    } else {
        first.checked_sub_months(shift)?
    };

    let offset = TimeDelta::try_days(day.checked_sub(1)?)?
        .checked_add(&TimeDelta::try_hours(hour)?)?
        .checked_add(&TimeDelta::try_minutes(minute)?)?
        .checked_add(&TimeDelta::try_seconds(second)?)?;

    date.and_time(NaiveTime::MIN).checked_add_signed(offset)
}

/// Listing parameters for the device's `sms_data_total` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmsQuery {
    pub page: u32,
    pub per_page: u32,
    /// Storage area (`mem_store`): 0, 1 or 2.
    pub mem_store: u32,
    /// Tag filter; 10 means all tags.
    pub tag: u32,
}

impl Default for SmsQuery {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 500,
            mem_store: 1,
            tag: 10,
        }
    }
}

impl SmsQuery {
    /// Build a query from HTTP query parameters (`page`, `perPage`,
    /// `memStore`, `tag`).
    ///
    /// Absent or empty values take their default.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParam`] naming the first non-numeric or
    /// out-of-range parameter.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, InvalidParam> {
        let defaults = Self::default();
        let get = |name: &'static str| params.get(name).map(String::as_str);

        Ok(Self {
            page: Self::parse_param("page", get("page"), defaults.page, 0, 100)?,
            per_page: Self::parse_param("perPage", get("perPage"), defaults.per_page, 1, 1000)?,
            mem_store: Self::parse_param("memStore", get("memStore"), defaults.mem_store, 0, 2)?,
            tag: Self::parse_param("tag", get("tag"), defaults.tag, 0, 10)?,
        })
    }

    /// Parse one parameter, enforcing `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParam`] if `raw` is not a number in range.
    pub fn parse_param(
        name: &'static str,
        raw: Option<&str>,
        default: u32,
        min: u32,
        max: u32,
    ) -> Result<u32, InvalidParam> {
        match raw {
            None | Some("") => Ok(default),
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|v| (min..=max).contains(v))
                .ok_or(InvalidParam(name)),
        }
    }
}
