//! Field rules, rule sets, and rule files.
//!
//! A rule names one output field, the path it is read from, how the raw
//! value is coerced, and the fallback used when that fails.
//!
//! # Example
//!
//! ```
//! use dtomap::{FieldRule, RuleSet};
//!
//! let rules = RuleSet::build([
//!     FieldRule::string("id").from("order_id"),
//!     FieldRule::string("userName").from("user_info.name").or("Anonymous"),
//!     FieldRule::boolean("isPaid"),
//! ])
//! .unwrap();
//!
//! assert_eq!(rules.targets(), vec!["id", "userName", "isPaid"]);
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{normalize_date, CoercionKind};
use crate::error::{DtomapError, Result};
use crate::path::FieldPath;
use crate::value::FieldValue;

/// Declarative mapping of one output field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    /// Output field name.
    pub target: String,
    /// Where to read the raw value.
    pub source: FieldPath,
    /// How to coerce the raw value.
    pub kind: CoercionKind,
    /// Value used when the source is absent or cannot be coerced.
    pub fallback: FieldValue,
}

impl FieldRule {
    /// Create a rule, checking that the fallback belongs to `kind`.
    ///
    /// Number fallbacks must be finite. Date fallbacks are truncated to
    /// milliseconds and must fall in years 0 through 9999.
    pub fn new(
        target: impl Into<String>,
        source: FieldPath,
        kind: CoercionKind,
        fallback: FieldValue,
    ) -> Result<Self> {
        Self {
            target: target.into(),
            source,
            kind,
            fallback,
        }
        .validated()
    }

    /// Check the fallback against the kind and bring it into the form the
    /// mapper itself produces.
    fn validated(mut self) -> Result<Self> {
        let mismatch = |rule: &Self, found: String| DtomapError::FallbackMismatch {
            target: rule.target.clone(),
            expected: rule.kind.to_string(),
            found,
        };

        if self.fallback.kind() != self.kind {
            return Err(mismatch(&self, self.fallback.kind().to_string()));
        }

        match self.fallback {
            FieldValue::Number(n) if !n.is_finite() => {
                return Err(mismatch(&self, format!("non-finite number {}", n)));
            }
            FieldValue::Date(date) => {
                let normalized = normalize_date(date)
                    .ok_or_else(|| mismatch(&self, format!("out-of-range date {}", date)))?;
                self.fallback = FieldValue::Date(normalized);
            }
            _ => {}
        }

        Ok(self)
    }

    pub fn string(target: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(target, CoercionKind::String)
    }

    pub fn number(target: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(target, CoercionKind::Number)
    }

    pub fn boolean(target: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(target, CoercionKind::Boolean)
    }

    pub fn date(target: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(target, CoercionKind::Date)
    }

    pub fn array(target: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(target, CoercionKind::Array)
    }

    /// Rule-file representation of this rule. A source equal to the target
    /// key is left out.
    pub fn to_entry(&self) -> RuleEntry {
        let reads_target = self.source == FieldPath::from_keys([self.target.as_str()]);
        RuleEntry {
            target: self.target.clone(),
            source: (!reads_target).then(|| self.source.to_string()),
            kind: self.kind,
            fallback: Some(self.fallback.to_json()),
        }
    }
}

/// Builder for [`FieldRule`].
///
/// The source defaults to a single key equal to the target, and the
/// fallback defaults to the kind's default value.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    target: String,
    kind: CoercionKind,
    source: Option<String>,
    fallback: Option<FieldValue>,
}

impl RuleBuilder {
    pub fn new(target: impl Into<String>, kind: CoercionKind) -> Self {
        Self {
            target: target.into(),
            kind,
            source: None,
            fallback: None,
        }
    }

    /// Read from a dotted source path.
    pub fn from(mut self, path: impl Into<String>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Use `fallback` when the source is absent or invalid.
    pub fn or(mut self, fallback: impl Into<FieldValue>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn build(self) -> Result<FieldRule> {
        let source = match self.source {
            Some(text) => FieldPath::parse(&text)?,
            None => FieldPath::from_keys([self.target.as_str()]),
        };
        let fallback = self
            .fallback
            .unwrap_or_else(|| FieldValue::default_for(self.kind));

        FieldRule::new(self.target, source, self.kind, fallback)
    }
}

impl TryFrom<RuleBuilder> for FieldRule {
    type Error = DtomapError;

    fn try_from(builder: RuleBuilder) -> Result<Self> {
        builder.build()
    }
}

/// One rule as written in a rule file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Output field name.
    pub target: String,
    /// Dotted source path (defaults to the target).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Coercion kind.
    pub kind: CoercionKind,
    /// Fallback literal (defaults to the kind's default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Value>,
}

impl RuleEntry {
    /// Validate the entry and turn it into a rule.
    pub fn to_rule(&self) -> Result<FieldRule> {
        let mut builder = RuleBuilder::new(self.target.clone(), self.kind);
        if let Some(ref source) = self.source {
            builder = builder.from(source.clone());
        }
        if let Some(ref literal) = self.fallback {
            let fallback = FieldValue::from_literal(self.kind, literal).ok_or_else(|| {
                DtomapError::FallbackMismatch {
                    target: self.target.clone(),
                    expected: self.kind.to_string(),
                    found: literal.to_string(),
                }
            })?;
            builder = builder.or(fallback);
        }
        builder.build()
    }
}

/// On-disk layout of a rule file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    pub rules: Vec<RuleEntry>,
}

/// An ordered list of rules with unique target names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from builders, in order.
    pub fn build<I>(builders: I) -> Result<Self>
    where
        I: IntoIterator<Item = RuleBuilder>,
    {
        let mut set = Self::new();
        for builder in builders {
            set.push(builder.build()?)?;
        }
        Ok(set)
    }

    /// Append a rule built from `builder`.
    pub fn with_rule(mut self, builder: RuleBuilder) -> Result<Self> {
        self.push(builder.build()?)?;
        Ok(self)
    }

    /// Append a rule. Fails if its target is already declared or its
    /// fallback does not hold for its kind.
    pub fn push(&mut self, rule: FieldRule) -> Result<()> {
        let rule = rule.validated()?;
        if self.rules.iter().any(|r| r.target == rule.target) {
            return Err(DtomapError::DuplicateTarget(rule.target));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldRule> {
        self.rules.iter()
    }

    pub fn get(&self, target: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.target == target)
    }

    /// Target names in declaration order.
    pub fn targets(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.target.as_str()).collect()
    }

    /// Rules that read each target back from a field of the same name.
    ///
    /// Mapping a record's own JSON output with this set reproduces the record.
    pub fn passthrough(&self) -> Self {
        let rules = self
            .rules
            .iter()
            .map(|r| FieldRule {
                target: r.target.clone(),
                source: FieldPath::from_keys([r.target.as_str()]),
                kind: r.kind,
                fallback: r.fallback.clone(),
            })
            .collect();
        Self { rules }
    }

    /// Validate rule-file entries and build a rule set.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RuleEntry>,
    {
        let mut set = Self::new();
        for entry in entries {
            set.push(entry.to_rule()?)?;
        }
        Ok(set)
    }

    pub fn to_rule_file(&self) -> RuleFile {
        RuleFile {
            rules: self.rules.iter().map(FieldRule::to_entry).collect(),
        }
    }

    /// Parse a rule file from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(text)?;
        Self::from_entries(&file.rules)
    }

    /// Load a rule file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| DtomapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let reader = BufReader::new(file);
        let rule_file: RuleFile = serde_json::from_reader(reader).map_err(|e| {
            DtomapError::Config(format!(
                "Failed to parse rule file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_entries(&rule_file.rules)
    }

    /// Save as a pretty-printed rule file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| DtomapError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| DtomapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.to_rule_file())?;

        Ok(())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a FieldRule;
    type IntoIter = std::slice::Iter<'a, FieldRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let rule = FieldRule::boolean("isPaid").build().unwrap();
        assert_eq!(rule.source, FieldPath::from_keys(["isPaid"]));
        assert_eq!(rule.fallback, FieldValue::Boolean(false));
    }

    #[test]
    fn test_builder_with_source_and_fallback() {
        let rule = FieldRule::string("userName")
            .from("user_info.name")
            .or("Anonymous")
            .build()
            .unwrap();
        assert_eq!(rule.source.to_string(), "user_info.name");
        assert_eq!(rule.fallback, FieldValue::from("Anonymous"));
    }

    #[test]
    fn test_fallback_must_match_kind() {
        let err = FieldRule::number("total").or("zero").build().unwrap_err();
        assert!(matches!(err, DtomapError::FallbackMismatch { .. }));
    }

    #[test]
    fn test_non_finite_number_fallback_rejected() {
        for fallback in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = FieldRule::number("total").or(fallback).build().unwrap_err();
            assert!(matches!(err, DtomapError::FallbackMismatch { ref target, .. } if target == "total"));
        }
    }

    #[test]
    fn test_date_fallback_truncated_to_millis() {
        let precise = Utc.timestamp_opt(1_714_521_600, 123_456_789).unwrap();
        let rule = FieldRule::date("createdAt").or(precise).build().unwrap();
        assert_eq!(
            rule.fallback,
            FieldValue::Date(Utc.timestamp_opt(1_714_521_600, 123_000_000).unwrap())
        );
    }

    #[test]
    fn test_date_fallback_out_of_range_rejected() {
        let far = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        let err = FieldRule::date("createdAt").or(far).build().unwrap_err();
        assert!(matches!(err, DtomapError::FallbackMismatch { .. }));
    }

    #[test]
    fn test_push_checks_hand_built_rules() {
        let mut rules = RuleSet::new();
        let err = rules
            .push(FieldRule {
                target: "total".to_string(),
                source: FieldPath::from_keys(["total"]),
                kind: CoercionKind::Number,
                fallback: FieldValue::from("x"),
            })
            .unwrap_err();
        assert!(matches!(err, DtomapError::FallbackMismatch { .. }));
        assert!(rules.is_empty());

        rules
            .push(FieldRule {
                target: "createdAt".to_string(),
                source: FieldPath::from_keys(["createdAt"]),
                kind: CoercionKind::Date,
                fallback: FieldValue::Date(Utc.timestamp_opt(0, 999_999).unwrap()),
            })
            .unwrap();
        assert_eq!(
            rules.get("createdAt").unwrap().fallback,
            FieldValue::default_for(CoercionKind::Date)
        );
    }

    #[test]
    fn test_invalid_source_path() {
        let err = FieldRule::string("x").from("a..b").build().unwrap_err();
        assert!(matches!(err, DtomapError::InvalidPath { .. }));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let err = RuleSet::build([
            FieldRule::string("id").from("order_id"),
            FieldRule::string("id").from("legacy_id"),
        ])
        .unwrap_err();
        assert!(matches!(err, DtomapError::DuplicateTarget(ref t) if t == "id"));
    }

    #[test]
    fn test_with_rule_chain() {
        let rules = RuleSet::new()
            .with_rule(FieldRule::string("id").from("order_id"))
            .and_then(|s| s.with_rule(FieldRule::date("createdAt")))
            .unwrap();
        assert_eq!(rules.targets(), vec!["id", "createdAt"]);
        assert_eq!(rules.get("createdAt").unwrap().kind, CoercionKind::Date);
    }

    #[test]
    fn test_rule_file_parsing() {
        let text = r#"{
            "rules": [
                {"target": "id", "source": "order_id", "kind": "identity"},
                {"target": "userName", "source": "user_info.name", "kind": "string", "fallback": "Anonymous"},
                {"target": "createdAt", "kind": "date", "fallback": 0},
                {"target": "tags", "kind": "array", "fallback": ["untagged"]}
            ]
        }"#;
        let rules = RuleSet::from_json_str(text).unwrap();

        assert_eq!(rules.len(), 4);
        assert_eq!(rules.get("id").unwrap().kind, CoercionKind::String);
        assert_eq!(rules.get("createdAt").unwrap().source.to_string(), "createdAt");
        assert_eq!(
            rules.get("tags").unwrap().fallback,
            FieldValue::Array(vec![json!("untagged")])
        );
    }

    #[test]
    fn test_rule_file_bad_fallback() {
        let text = r#"{"rules": [{"target": "n", "kind": "number", "fallback": "zero"}]}"#;
        assert!(matches!(
            RuleSet::from_json_str(text),
            Err(DtomapError::FallbackMismatch { .. })
        ));
    }

    #[test]
    fn test_rule_file_unknown_kind() {
        let text = r#"{"rules": [{"target": "n", "kind": "money"}]}"#;
        assert!(matches!(RuleSet::from_json_str(text), Err(DtomapError::Json(_))));
    }

    #[test]
    fn test_entries_round_trip() {
        let rules = RuleSet::build([
            FieldRule::string("userName").from("user_info.name").or("Anonymous"),
            FieldRule::date("createdAt"),
        ])
        .unwrap();
        let file = rules.to_rule_file();
        let back = RuleSet::from_entries(&file.rules).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_passthrough_reads_targets() {
        let rules = RuleSet::build([FieldRule::string("id").from("order_id")]).unwrap();
        let identity = rules.passthrough();
        assert_eq!(identity.get("id").unwrap().source, FieldPath::from_keys(["id"]));
    }
}
