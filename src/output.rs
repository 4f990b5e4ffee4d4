//! JSON rendering of compiled conditions.
//!
//! Every condition becomes an object with an `"op"` member. Comparisons carry
//! `"field"` and `"value"`, logical nodes carry `"left"` and `"right"`. Keys
//! are emitted in sorted order so the output is deterministic.
//!
//! # Examples
//!
//! ```
//! use sieve_lang::condition::{CompareOp, Condition, FieldRef};
//! use sieve_lang::output::to_json;
//! use sieve_lang::Value;
//!
//! let condition = Condition::Compare {
//!     field: FieldRef { path: vec!["address".into()], name: "number".into(), join: Some(0) },
//!     op: CompareOp::GreaterThan,
//!     value: Value::I32(10),
//! };
//! assert_eq!(
//!     to_json(&condition),
//!     r#"{"field":"address.number","op":">","value":10}"#
//! );
//! ```

use serde_json::{Map, Number, Value as Json, json};

use crate::{
    condition::{Condition, FieldRef},
    value::Value,
};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, condition: &Condition) -> String {
        let json = condition_to_json(condition);
        if self.pretty {
            format!("{json:#}")
        } else {
            json.to_string()
        }
    }
}

/// Builds the JSON tree for `condition`.
pub fn condition_to_json(condition: &Condition) -> Json {
    match condition {
        Condition::Compare { field, op, value } => {
            node(op.symbol(), field, [("value", value_to_json(value))])
        }
        Condition::Test { field, test } => node(&test.symbol().to_lowercase(), field, []),
        Condition::Like {
            field,
            pattern,
            negated,
        } => {
            let op = if *negated { "not like" } else { "like" };
            node(op, field, [("pattern", Json::String(pattern.clone()))])
        }
        Condition::In { field, values } => {
            let values = values.iter().map(value_to_json).collect();
            node("in", field, [("values", Json::Array(values))])
        }
        Condition::Between { field, low, high } => node(
            "between",
            field,
            [("low", value_to_json(low)), ("high", value_to_json(high))],
        ),
        Condition::Not(inner) => json!({ "op": "not", "condition": condition_to_json(inner) }),
        Condition::And(left, right) => json!({
            "op": "and",
            "left": condition_to_json(left),
            "right": condition_to_json(right),
        }),
        Condition::Or(left, right) => json!({
            "op": "or",
            "left": condition_to_json(left),
            "right": condition_to_json(right),
        }),
    }
}

fn node<const N: usize>(op: &str, field: &FieldRef, extra: [(&str, Json); N]) -> Json {
    let mut object = Map::new();
    object.insert("op".to_string(), Json::String(op.to_string()));
    object.insert("field".to_string(), Json::String(field.dotted()));
    for (key, value) in extra {
        object.insert(key.to_string(), value);
    }
    Json::Object(object)
}

/// JSON form of a converted literal. Numbers that JSON cannot hold exactly
/// are written as strings.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Text(s) => Json::String(s.clone()),
        Value::Enum { variant, .. } => Json::String(variant.clone()),
        Value::I8(n) => Json::from(*n),
        Value::I16(n) => Json::from(*n),
        Value::I32(n) => Json::from(*n),
        Value::I64(n) => Json::from(*n),
        Value::I128(n) => match i64::try_from(*n) {
            Ok(n) => Json::from(n),
            Err(_) => Json::String(n.to_string()),
        },
        Value::F32(n) => float(f64::from(*n)),
        Value::F64(n) => float(*n),
        Value::BigInt(n) => Json::String(n.to_string()),
        Value::Decimal(d) => Json::String(d.to_string()),
        other => Json::String(other.to_string()),
    }
}

fn float(n: f64) -> Json {
    Number::from_f64(n).map_or(Json::Null, Json::Number)
}

/// Compact JSON for `condition`.
pub fn to_json(condition: &Condition) -> String {
    JsonPrinter::new(false).print(condition)
}

/// JSON for `condition` with two-space indentation.
pub fn to_json_pretty(condition: &Condition) -> String {
    JsonPrinter::new(true).print(condition)
}
