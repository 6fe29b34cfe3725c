//! Fuzz target for the mapper.
//!
//! This fuzzer tests that mapping:
//! 1. Never panics on any JSON input
//! 2. Always produces every declared field
//! 3. Never produces a value of the wrong kind

#![no_main]

use dtomap::{map_record, FieldRule, RuleSet};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs
    if data.len() > 10_000 {
        return;
    }

    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let rules = RuleSet::build([
        FieldRule::date("createdAt"),
        FieldRule::string("id").from("order_id"),
        FieldRule::string("userName").from("user_info.name").or("Anonymous"),
        FieldRule::boolean("isPaid"),
        FieldRule::number("total").from("totals.0.amount"),
        FieldRule::array("items"),
    ])
    .expect("static rules are valid");

    let record = map_record(&raw, &rules);
    assert_eq!(record.len(), rules.len());
    for rule in &rules {
        let value = record.get(&rule.target).expect("declared field present");
        assert_eq!(value.kind(), rule.kind);
    }
});
