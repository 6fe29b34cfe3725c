//! Integration tests for dtomap.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use dtomap::{
    map_record, map_record_with_audit, map_records, FieldMapper, FieldOutcome, FieldRule,
    FieldValue, RuleSet,
};

/// Rules equivalent to the order DTO served by the demo API.
fn order_rules() -> RuleSet {
    RuleSet::build([
        FieldRule::date("createdAt"),
        FieldRule::string("id").from("order_id"),
        FieldRule::string("userName").from("user_info.name").or("Anonymous"),
        FieldRule::boolean("isPaid"),
    ])
    .expect("order rules are valid")
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_renamed_field_scenario() {
    let rules = RuleSet::build([
        FieldRule::string("id").from("order_id"),
        FieldRule::string("userName").from("user_info.name").or("Anonymous"),
    ])
    .unwrap();

    let raw = json!({"order_id": "A1", "user_info": {"name": "Bo"}});
    assert_eq!(
        map_record(&raw, &rules).to_value(),
        json!({"id": "A1", "userName": "Bo"})
    );
}

#[test]
fn test_missing_nested_field_scenario() {
    let rules = RuleSet::build([
        FieldRule::string("id").from("order_id"),
        FieldRule::string("userName").from("user_info.name").or("Anonymous"),
    ])
    .unwrap();

    let raw = json!({"order_id": "A1"});
    assert_eq!(
        map_record(&raw, &rules).to_value(),
        json!({"id": "A1", "userName": "Anonymous"})
    );
}

#[test]
fn test_boolean_coercion_scenario() {
    let rules = RuleSet::build([FieldRule::boolean("isPaid")]).unwrap();

    assert_eq!(
        map_record(&json!({"isPaid": "1"}), &rules).to_value(),
        json!({"isPaid": true})
    );
    assert_eq!(
        map_record(&json!({"isPaid": "0"}), &rules).to_value(),
        json!({"isPaid": false})
    );
}

#[test]
fn test_full_order_mapping() {
    let raw = json!({
        "order_id": "ORD-1001",
        "createdAt": 1714566600000_i64,
        "user_info": {"name": "Taylor", "email": "taylor@example.com"},
        "isPaid": "1",
        "internal_note": "not exposed"
    });

    let record = map_record(&raw, &order_rules());

    assert_eq!(record.len(), 4);
    assert!(record.get("internal_note").is_none());
    assert_eq!(
        record.get("createdAt"),
        Some(&FieldValue::Date(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        ))
    );
    assert_eq!(
        record.to_value(),
        json!({
            "createdAt": "2024-05-01T12:30:00.000Z",
            "id": "ORD-1001",
            "userName": "Taylor",
            "isPaid": true
        })
    );
}

#[test]
fn test_dirty_order_degrades_per_field() {
    let raw = json!({
        "order_id": null,
        "createdAt": "not-a-date",
        "user_info": {"name": null},
        "isPaid": "yes"
    });

    let (record, audits) = map_record_with_audit(&raw, &order_rules());

    assert_eq!(
        record.to_value(),
        json!({
            "createdAt": "1970-01-01T00:00:00.000Z",
            "id": "",
            "userName": "Anonymous",
            "isPaid": false
        })
    );

    let fallbacks: Vec<&str> = audits
        .iter()
        .filter(|a| a.outcome.is_fallback())
        .map(|a| a.target.as_str())
        .collect();
    assert_eq!(fallbacks, vec!["createdAt", "id", "userName"]);
    assert_eq!(audits[3].outcome, FieldOutcome::Resolved);
}

// =============================================================================
// Property-style checks on fixed inputs
// =============================================================================

#[test]
fn test_identity_on_convertible_values() {
    let rules = RuleSet::build([
        FieldRule::string("name"),
        FieldRule::number("qty"),
        FieldRule::array("tags"),
    ])
    .unwrap();

    let raw = json!({"name": "Widget", "qty": 3, "tags": ["a", "b"]});
    let record = map_record(&raw, &rules);

    assert_eq!(record.get("name"), Some(&FieldValue::from("Widget")));
    assert_eq!(record.get("qty"), Some(&FieldValue::Number(3.0)));
    assert_eq!(
        record.get("tags"),
        Some(&FieldValue::Array(vec![json!("a"), json!("b")]))
    );
}

#[test]
fn test_idempotent_through_passthrough() {
    let rules = order_rules();
    let raw = json!({
        "order_id": "A1",
        "createdAt": "2024-05-01",
        "user_info": {"name": "Bo"},
        "isPaid": 1
    });

    let first = map_record(&raw, &rules);
    let second = map_record(&first.to_value(), &rules.passthrough());
    assert_eq!(first, second);

    let third = map_record(&second.to_value(), &rules.passthrough());
    assert_eq!(second, third);

    let precise = Utc.timestamp_opt(1_714_521_600, 123_456_789).unwrap();
    let rules = RuleSet::build([FieldRule::date("createdAt").from("created").or(precise)]).unwrap();
    let first = map_record(&json!({}), &rules);
    let second = map_record(&first.to_value(), &rules.passthrough());
    assert_eq!(first, second);
    assert_eq!(first.to_value(), json!({"createdAt": "2024-05-01T00:00:00.123Z"}));
}

#[test]
fn test_any_missing_intermediate_gives_fallback() {
    let rules = RuleSet::build([FieldRule::string("city")
        .from("customer.address.city")
        .or("Unknown")])
    .unwrap();

    let inputs: Vec<Value> = vec![
        json!({}),
        json!({"customer": null}),
        json!({"customer": {}}),
        json!({"customer": {"address": null}}),
        json!({"customer": {"address": "221B Baker St"}}),
        json!({"customer": {"address": {"city": null}}}),
        json!({"customer": []}),
        Value::Null,
    ];

    for raw in inputs {
        assert_eq!(
            map_record(&raw, &rules).get("city"),
            Some(&FieldValue::from("Unknown")),
            "raw = {}",
            raw
        );
    }
}

#[test]
fn test_map_product_list() {
    let rules = RuleSet::build([
        FieldRule::number("id"),
        FieldRule::string("name"),
        FieldRule::number("price").or(0),
    ])
    .unwrap();
    let mapper = FieldMapper::new(rules);

    let raw = json!([
        {"id": 1, "name": "Keyboard", "price": "49.90"},
        {"id": "2", "name": "Mouse"},
        "garbage"
    ]);

    let records = mapper.map_many(&raw);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].get("price"), Some(&FieldValue::Number(49.9)));
    assert_eq!(records[1].get("id"), Some(&FieldValue::Number(2.0)));
    assert_eq!(records[1].get("price"), Some(&FieldValue::Number(0.0)));
    assert_eq!(records[2].get("name"), Some(&FieldValue::from("")));
    assert_eq!(map_records(&raw, mapper.rules()), records);
}
