//! Coercion of raw JSON values into typed field values.
//!
//! Every coercion is total from the caller's point of view: an absent value,
//! a `null`, or a value the coercion rejects all yield the fallback.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DtomapError;
use crate::value::FieldValue;

// Decimal literal: sign, digits, optional fraction, optional exponent.
// Rejects `inf`, `NaN` and hex forms that `f64::from_str` or other parsers accept.
static NUMBER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Date-only and zone-less date-time layouts, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest time value (in ms from the epoch) a JSON client date can hold.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// How a raw value is converted into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    /// Text representation. `identity` is accepted as an alias.
    #[serde(alias = "identity")]
    String,
    /// Numeric parse.
    Number,
    /// `true` only for `true`, `"true"`, `1` and `"1"`.
    Boolean,
    /// Point in time.
    Date,
    /// Pass-through of JSON arrays.
    Array,
}

impl CoercionKind {
    pub const ALL: [CoercionKind; 5] = [
        CoercionKind::String,
        CoercionKind::Number,
        CoercionKind::Boolean,
        CoercionKind::Date,
        CoercionKind::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoercionKind::String => "string",
            CoercionKind::Number => "number",
            CoercionKind::Boolean => "boolean",
            CoercionKind::Date => "date",
            CoercionKind::Array => "array",
        }
    }
}

impl fmt::Display for CoercionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CoercionKind {
    type Err = DtomapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "identity" | "text" => Ok(CoercionKind::String),
            "number" => Ok(CoercionKind::Number),
            "boolean" | "bool" => Ok(CoercionKind::Boolean),
            "date" => Ok(CoercionKind::Date),
            "array" => Ok(CoercionKind::Array),
            _ => Err(DtomapError::UnknownKind(s.to_string())),
        }
    }
}

/// Coerce `raw` to `kind`, substituting `fallback` on absence or failure.
///
/// Never fails and never panics. `None` and `Some(null)` count as absent.
pub fn coerce_safe(raw: Option<&Value>, kind: CoercionKind, fallback: &FieldValue) -> FieldValue {
    match raw {
        None | Some(Value::Null) => fallback.clone(),
        Some(value) => try_coerce(value, kind).unwrap_or_else(|| fallback.clone()),
    }
}

/// Coerce a present, non-null value. `None` means the coercion rejected it.
pub(crate) fn try_coerce(value: &Value, kind: CoercionKind) -> Option<FieldValue> {
    if value.is_null() {
        return None;
    }

    match kind {
        CoercionKind::String => Some(FieldValue::String(to_text(value))),
        CoercionKind::Number => to_number(value).map(FieldValue::Number),
        CoercionKind::Boolean => Some(FieldValue::Boolean(is_truthy(value))),
        CoercionKind::Date => to_date(value).map(FieldValue::Date),
        CoercionKind::Array => match value {
            Value::Array(items) => Some(FieldValue::Array(items.clone())),
            _ => None,
        },
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display drops a zero fraction: 3.0 -> "3"
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        // Arrays and objects render as compact JSON
        other => other.to_string(),
    }
}

fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => parse_decimal(s)?,
        _ => return None,
    };

    n.is_finite().then_some(n)
}

fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !NUMBER_LITERAL.is_match(trimmed) {
        return None;
    }
    trimmed.parse().ok()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true" || s == "1",
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    let date = match value {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
                return None;
            }
            DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)
        }
        _ => None,
    }?;

    normalize_date(date)
}

/// Clamp to millisecond precision and the four-digit years RFC 3339 can express.
pub(crate) fn normalize_date(date: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (0..=9999)
        .contains(&date.year())
        .then(|| date.trunc_subsecs(3))
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
