//! Typed values produced by the mapper.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::coerce::{try_coerce, CoercionKind};

/// Largest integer an `f64` holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A coerced output value. Each variant belongs to exactly one coercion kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
}

impl FieldValue {
    /// The coercion kind this value belongs to.
    pub fn kind(&self) -> CoercionKind {
        match self {
            FieldValue::String(_) => CoercionKind::String,
            FieldValue::Number(_) => CoercionKind::Number,
            FieldValue::Boolean(_) => CoercionKind::Boolean,
            FieldValue::Date(_) => CoercionKind::Date,
            FieldValue::Array(_) => CoercionKind::Array,
        }
    }

    /// The default fallback for a kind: `""`, `0`, `false`, the Unix epoch, `[]`.
    pub fn default_for(kind: CoercionKind) -> Self {
        match kind {
            CoercionKind::String => FieldValue::String(String::new()),
            CoercionKind::Number => FieldValue::Number(0.0),
            CoercionKind::Boolean => FieldValue::Boolean(false),
            CoercionKind::Date => FieldValue::Date(DateTime::<Utc>::UNIX_EPOCH),
            CoercionKind::Array => FieldValue::Array(Vec::new()),
        }
    }

    /// Interpret a JSON literal as a value of `kind`, without any coercion.
    ///
    /// Used for fallbacks declared in rule files. Dates accept the same text
    /// and epoch-millisecond forms as date coercion.
    pub fn from_literal(kind: CoercionKind, literal: &Value) -> Option<Self> {
        match (kind, literal) {
            (CoercionKind::String, Value::String(s)) => Some(FieldValue::String(s.clone())),
            (CoercionKind::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
            (CoercionKind::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
            (CoercionKind::Date, Value::String(_) | Value::Number(_)) => {
                try_coerce(literal, CoercionKind::Date)
            }
            (CoercionKind::Array, Value::Array(items)) => Some(FieldValue::Array(items.clone())),
            _ => None,
        }
    }

    /// Convert to a JSON value, formatting dates as RFC 3339 with milliseconds.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Number(n) => number_to_json(*n),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Date(d) => Value::String(format_date(d)),
            FieldValue::Array(items) => Value::Array(items.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Format a date the way JSON clients expect: `1970-01-01T00:00:00.000Z`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Integral values serialize without a fractional part.
fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(f64::from(n))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(d: DateTime<Utc>) -> Self {
        FieldValue::Date(d)
    }
}

impl From<Vec<Value>> for FieldValue {
    fn from(items: Vec<Value>) -> Self {
        FieldValue::Array(items)
    }
}
