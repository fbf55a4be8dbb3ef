//! Registration timestamps.
//!
//! Persisted as local wall-clock time with minute precision, e.g. `2025-03-14 09:26`.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

use crate::errors::ModelError;

pub const FORMAT: &str = "%Y-%m-%d %H:%M";

/// Current local time truncated to the minute, so it survives a save/load cycle unchanged.
pub fn now_minute() -> NaiveDateTime {
    truncate_to_minute(Local::now().naive_local())
}

pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

pub fn format(ts: &NaiveDateTime) -> String {
    ts.format(FORMAT).to_string()
}

pub fn parse(raw: &str) -> Result<NaiveDateTime, ModelError> {
    NaiveDateTime::parse_from_str(raw.trim(), FORMAT)
        .map_err(|e| ModelError::Timestamp(format!("{raw:?}: {e}")))
}

/// `#[serde(with = "timestamp::minute")]`
pub mod minute {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
