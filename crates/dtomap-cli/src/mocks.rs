//! In-memory mock data and the rule sets the demo API serves it through.

use dtomap::{FieldRule, Result, RuleSet};
use serde_json::{json, Value};

/// A raw order as an upstream service would return it.
pub fn mock_order() -> Value {
    json!({
        "order_id": "ORD-20240501-001",
        "createdAt": 1714566600000_i64,
        "user_info": {
            "name": "Taylor",
            "email": "taylor@example.com"
        },
        "isPaid": "1",
        "internal_remark": "priority customer"
    })
}

pub fn mock_user() -> Value {
    json!({
        "id": 1,
        "name": "Taylor",
        "email": "taylor@example.com",
        "role": "admin",
        "password_hash": "not-for-clients"
    })
}

pub fn mock_products() -> Value {
    json!([
        {"id": 1, "name": "Mechanical Keyboard", "price": 89.0, "stock": 12},
        {"id": 2, "name": "Wireless Mouse", "price": 25.5, "stock": 40},
        {"id": 3, "name": "USB-C Hub", "price": "39.99", "stock": 0}
    ])
}

/// Order DTO: epoch to date, `order_id` renamed to `id`, nested user name
/// with a textual fallback, and `"1"`/`"0"` payment flag to boolean.
pub fn order_rules() -> Result<RuleSet> {
    RuleSet::build([
        FieldRule::date("createdAt"),
        FieldRule::string("id").from("order_id"),
        FieldRule::string("userName").from("user_info.name").or("Anonymous"),
        FieldRule::boolean("isPaid"),
    ])
}

/// Public projection of a user.
pub fn slim_user_rules() -> Result<RuleSet> {
    RuleSet::build([
        FieldRule::string("name").or("Anonymous"),
        FieldRule::string("role").or("guest"),
    ])
}

/// Product summary used by the dashboard.
pub fn product_summary_rules() -> Result<RuleSet> {
    RuleSet::build([FieldRule::number("id"), FieldRule::string("name")])
}
