//! Fuzz target for rule-file parsing.
//!
//! Arbitrary text must either load as a rule set or return an error.

#![no_main]

use dtomap::RuleSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(rules) = RuleSet::from_json_str(text) {
            let reparsed = serde_json::to_string(&rules.to_rule_file())
                .ok()
                .and_then(|json| RuleSet::from_json_str(&json).ok());
            assert!(reparsed.is_some());
        }
    }
});
