//! The safe field mapper.
//!
//! Mapping is total: every declared field is present in the output, holding
//! either the coerced source value or the rule's fallback. One field's
//! failure never affects another.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{try_coerce, CoercionKind};
use crate::path::resolve_path;
use crate::rule::{FieldRule, RuleSet};
use crate::value::FieldValue;

/// A mapped record: every declared target, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, target: &str) -> Option<&FieldValue> {
        self.fields.get(target)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    /// Convert to a JSON object.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Why a field holds the value it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOutcome {
    /// The source resolved and coerced.
    Resolved,
    /// The source path did not resolve.
    Missing,
    /// The source path resolved to `null`.
    Null,
    /// The source value could not be coerced.
    Invalid,
}

impl FieldOutcome {
    /// Whether the fallback was used.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, FieldOutcome::Resolved)
    }
}

/// Audit entry for one mapped field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAudit {
    /// Output field name.
    pub target: String,
    /// Source path as dotted text.
    pub source: String,
    /// Coercion applied.
    pub kind: CoercionKind,
    /// How the value was obtained.
    pub outcome: FieldOutcome,
}

/// Map `raw` through `rules`. Never fails.
pub fn map_record(raw: &Value, rules: &RuleSet) -> Record {
    let fields = rules
        .iter()
        .map(|rule| (rule.target.clone(), apply_rule(raw, rule).0))
        .collect();
    Record { fields }
}

/// Map `raw` and report, per rule, whether the fallback was used.
pub fn map_record_with_audit(raw: &Value, rules: &RuleSet) -> (Record, Vec<FieldAudit>) {
    let mut fields = IndexMap::with_capacity(rules.len());
    let mut audits = Vec::with_capacity(rules.len());

    for rule in rules {
        let (value, outcome) = apply_rule(raw, rule);
        fields.insert(rule.target.clone(), value);
        audits.push(FieldAudit {
            target: rule.target.clone(),
            source: rule.source.to_string(),
            kind: rule.kind,
            outcome,
        });
    }

    (Record { fields }, audits)
}

/// Map every element of an array, or `raw` itself when it is not an array.
pub fn map_records(raw: &Value, rules: &RuleSet) -> Vec<Record> {
    match raw {
        Value::Array(items) => items.iter().map(|item| map_record(item, rules)).collect(),
        other => vec![map_record(other, rules)],
    }
}

/// Map a whole document into JSON.
///
/// An array maps element-wise into an array of objects; any other value maps
/// into a single object. Audit entries are concatenated in element order.
pub fn map_document(raw: &Value, rules: &RuleSet) -> (Value, Vec<FieldAudit>) {
    match raw {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            let mut audits = Vec::with_capacity(items.len() * rules.len());
            for item in items {
                let (record, item_audits) = map_record_with_audit(item, rules);
                records.push(record.to_value());
                audits.extend(item_audits);
            }
            (Value::Array(records), audits)
        }
        other => {
            let (record, audits) = map_record_with_audit(other, rules);
            (record.to_value(), audits)
        }
    }
}

fn apply_rule(raw: &Value, rule: &FieldRule) -> (FieldValue, FieldOutcome) {
    match resolve_path(raw, &rule.source) {
        None => (rule.fallback.clone(), FieldOutcome::Missing),
        Some(Value::Null) => (rule.fallback.clone(), FieldOutcome::Null),
        Some(value) => match try_coerce(value, rule.kind) {
            Some(coerced) => (coerced, FieldOutcome::Resolved),
            None => (rule.fallback.clone(), FieldOutcome::Invalid),
        },
    }
}

/// A rule set bound to the mapping operations.
///
/// Cheap to share behind an `Arc`; mapping takes `&self`.
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    rules: RuleSet,
}

impl FieldMapper {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn map(&self, raw: &Value) -> Record {
        map_record(raw, &self.rules)
    }

    pub fn map_with_audit(&self, raw: &Value) -> (Record, Vec<FieldAudit>) {
        map_record_with_audit(raw, &self.rules)
    }

    pub fn map_many(&self, raw: &Value) -> Vec<Record> {
        map_records(raw, &self.rules)
    }

    pub fn map_document(&self, raw: &Value) -> (Value, Vec<FieldAudit>) {
        map_document(raw, &self.rules)
    }
}

impl From<RuleSet> for FieldMapper {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::FieldRule;
    use serde_json::json;

    fn order_rules() -> RuleSet {
        RuleSet::build([
            FieldRule::string("id").from("order_id"),
            FieldRule::string("userName").from("user_info.name").or("Anonymous"),
        ])
        .unwrap()
    }

    #[test]
    fn test_rename_and_nested() {
        let raw = json!({"order_id": "A1", "user_info": {"name": "Bo"}});
        let record = map_record(&raw, &order_rules());
        assert_eq!(record.to_value(), json!({"id": "A1", "userName": "Bo"}));
    }

    #[test]
    fn test_missing_nested_uses_fallback() {
        let raw = json!({"order_id": "A1"});
        let record = map_record(&raw, &order_rules());
        assert_eq!(record.to_value(), json!({"id": "A1", "userName": "Anonymous"}));
    }

    #[test]
    fn test_output_follows_declaration_order() {
        let raw = json!({"user_info": {"name": "Bo"}, "order_id": "A1"});
        let record = map_record(&raw, &order_rules());
        let keys: Vec<&String> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "userName"]);
    }

    #[test]
    fn test_primitive_and_null_roots() {
        for raw in [Value::Null, json!(7), json!("text"), json!([1, 2])] {
            let record = map_record(&raw, &order_rules());
            assert_eq!(record.len(), 2);
            assert_eq!(record.get("userName"), Some(&FieldValue::from("Anonymous")));
            assert_eq!(record.get("id"), Some(&FieldValue::from("")));
        }
    }

    #[test]
    fn test_fields_fail_independently() {
        let rules = RuleSet::build([
            FieldRule::number("total").or(-1),
            FieldRule::string("id").from("order_id"),
        ])
        .unwrap();
        let raw = json!({"total": "lots", "order_id": 9});
        let record = map_record(&raw, &rules);
        assert_eq!(record.get("total"), Some(&FieldValue::Number(-1.0)));
        assert_eq!(record.get("id"), Some(&FieldValue::from("9")));
    }

    #[test]
    fn test_audit_outcomes() {
        let rules = RuleSet::build([
            FieldRule::string("id").from("order_id"),
            FieldRule::string("userName").from("user_info.name").or("Anonymous"),
            FieldRule::number("total"),
            FieldRule::date("createdAt"),
        ])
        .unwrap();
        let raw = json!({"order_id": "A1", "total": null, "createdAt": "yesterday"});
        let (record, audits) = map_record_with_audit(&raw, &rules);

        assert_eq!(record, map_record(&raw, &rules));
        let outcomes: Vec<FieldOutcome> = audits.iter().map(|a| a.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                FieldOutcome::Resolved,
                FieldOutcome::Missing,
                FieldOutcome::Null,
                FieldOutcome::Invalid,
            ]
        );
        assert_eq!(audits[1].source, "user_info.name");
        assert!(audits[3].outcome.is_fallback());
    }

    #[test]
    fn test_map_records_array_and_single() {
        let mapper = FieldMapper::new(order_rules());
        let many = mapper.map_many(&json!([{"order_id": "A1"}, {"order_id": "A2"}]));
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].get("id"), Some(&FieldValue::from("A2")));

        let single = mapper.map_many(&json!({"order_id": "A3"}));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_map_document_shapes() {
        let rules = order_rules();

        let (single, audits) = map_document(&json!({"order_id": "A1"}), &rules);
        assert_eq!(single, json!({"id": "A1", "userName": "Anonymous"}));
        assert_eq!(audits.len(), 2);

        let (many, audits) = map_document(&json!([{"order_id": "A1"}, {}]), &rules);
        assert_eq!(
            many,
            json!([
                {"id": "A1", "userName": "Anonymous"},
                {"id": "", "userName": "Anonymous"}
            ])
        );
        assert_eq!(audits.len(), 4);
        assert_eq!(audits.iter().filter(|a| a.outcome.is_fallback()).count(), 3);
    }

    #[test]
    fn test_record_serializes_as_object() {
        let rules = RuleSet::build([FieldRule::date("createdAt"), FieldRule::boolean("isPaid")]).unwrap();
        let record = map_record(&json!({"createdAt": 0, "isPaid": "1"}), &rules);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"createdAt": "1970-01-01T00:00:00.000Z", "isPaid": true})
        );
    }
}
