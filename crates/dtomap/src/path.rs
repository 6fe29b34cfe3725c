//! Source paths and safe traversal of untyped JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DtomapError, Result};

/// An ordered sequence of keys describing how to descend into a JSON value.
///
/// Written as dotted text (`user_info.name`). A key made only of ASCII
/// digits also indexes into arrays (`items.0.sku`). A dot or backslash that
/// belongs to a key is escaped with a backslash (`meta.a\.b`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    keys: Vec<String>,
}

impl FieldPath {
    /// The empty path, which resolves to the root itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted path. The empty string is the root path.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::root());
        }

        let invalid = |message: String| DtomapError::InvalidPath {
            path: text.to_string(),
            message,
        };

        let mut keys = Vec::new();
        let mut key = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => key.push(escaped),
                    None => return Err(invalid("dangling escape at end of path".to_string())),
                },
                '.' => {
                    if key.is_empty() {
                        return Err(invalid(format!("empty segment at position {}", keys.len())));
                    }
                    keys.push(std::mem::take(&mut key));
                }
                _ => key.push(c),
            }
        }
        if key.is_empty() {
            return Err(invalid(format!("empty segment at position {}", keys.len())));
        }
        keys.push(key);

        Ok(Self { keys })
    }

    /// Build a path from raw keys. Keys may contain dots; they are escaped
    /// when the path is written as text.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The keys of this path, in traversal order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The last key, if any.
    pub fn terminal(&self) -> Option<&str> {
        self.keys.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&key.replace('\\', "\\\\").replace('.', "\\."))?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = DtomapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = DtomapError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

/// Follow `path` into `root`.
///
/// Returns `None` as soon as a step lands on a missing key, a `null`, or a
/// value that cannot be indexed. A `null` at the end of the path is returned
/// as `Some(&Value::Null)`. The empty path returns the root.
pub fn resolve_path<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.keys
        .iter()
        .try_fold(root, |current, key| step(current, key))
}

fn step<'a>(current: &'a Value, key: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => array_index(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
