// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and normalization.
//!
//! Feature service date fields are epoch milliseconds. Geodesignhub hands
//! back dates as ISO strings or numbers depending on the endpoint, so every
//! date is normalized to epoch milliseconds before it is written.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Midnight UTC of `date`, in epoch milliseconds.
pub fn date_to_epoch_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// A date value that is present but cannot be interpreted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unrecognized date value: {0}")]
pub struct InvalidDate(pub String);

/// Normalize a JSON date value to epoch milliseconds.
///
/// `null` and empty strings are absent (`Ok(None)`). Numbers are taken as
/// epoch milliseconds already. Strings may be integer milliseconds, RFC 3339,
/// `YYYY-MM-DDTHH:MM:SS` (UTC assumed) or `YYYY-MM-DD`.
pub fn to_epoch_millis(value: &Value) -> Result<Option<i64>, InvalidDate> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| InvalidDate(n.to_string())),
        Value::String(s) => parse_date_str(s.trim()),
        other => Err(InvalidDate(other.to_string())),
    }
}

fn parse_date_str(s: &str) -> Result<Option<i64>, InvalidDate> {
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(millis) = s.parse::<i64>() {
        return Ok(Some(millis));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.timestamp_millis()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Some(dt.and_utc().timestamp_millis()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Some(date_to_epoch_millis(date)));
    }
    Err(InvalidDate(s.to_string()))
}
