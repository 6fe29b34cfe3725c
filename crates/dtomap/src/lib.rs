//! dtomap: safe field mapping from untyped JSON into typed records.
//!
//! A mapping is a list of declarative field rules. Each rule reads a value
//! from a source path, coerces it to a kind, and falls back to a default
//! whenever the path is missing, `null`, or the coercion fails.
//!
//! # Core Principles
//!
//! - **Total**: mapping never fails; bad fields degrade to their fallback
//! - **Complete**: every declared field is present in the output
//! - **Pure**: no I/O and no shared state during mapping
//!
//! # Example
//!
//! ```
//! use dtomap::{map_record, FieldRule, RuleSet};
//! use serde_json::json;
//!
//! let rules = RuleSet::build([
//!     FieldRule::string("id").from("order_id"),
//!     FieldRule::string("userName").from("user_info.name").or("Anonymous"),
//!     FieldRule::boolean("isPaid"),
//! ])
//! .unwrap();
//!
//! let record = map_record(&json!({"order_id": "A1", "isPaid": "1"}), &rules);
//! assert_eq!(
//!     record.to_value(),
//!     json!({"id": "A1", "userName": "Anonymous", "isPaid": true})
//! );
//! ```

pub mod coerce;
pub mod error;
pub mod mapper;
pub mod path;
pub mod rule;
pub mod value;

pub use coerce::{coerce_safe, CoercionKind};
pub use error::{DtomapError, Result};
pub use mapper::{
    map_document, map_record, map_record_with_audit, map_records, FieldAudit, FieldMapper, FieldOutcome, Record,
};
pub use path::{resolve_path, FieldPath};
pub use rule::{FieldRule, RuleBuilder, RuleEntry, RuleFile, RuleSet};
pub use value::FieldValue;
