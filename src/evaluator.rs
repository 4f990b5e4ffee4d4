//! In-memory evaluation of compiled conditions against JSON records.
//!
//! Relationship segments are followed through nested objects. When a segment
//! holds an array, every element is visited and a predicate holds when any
//! reachable value satisfies it, mirroring an inner join.

use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};
use log::{trace, warn};
use regex::Regex;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde_json::Value as Json;
use uuid::Uuid;

use crate::{
    condition::{Condition, FieldRef, Test},
    convert::{in_local_zone, parse_date, parse_date_time, parse_time},
    value::Value,
};

static NULL: Json = Json::Null;

/// Evaluates [`Condition`]s, caching the regular expressions built from
/// `LIKE` patterns.
#[derive(Default)]
pub struct Evaluator {
    patterns: HashMap<String, Regex>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&mut self, condition: &Condition, record: &Json) -> bool {
        match condition {
            Condition::Compare { field, op, value } => reach(record, field)
                .into_iter()
                .any(|candidate| compare(value, candidate).is_some_and(|ord| op.accepts(ord))),
            Condition::Test { field, test } => {
                let candidates = reach(record, field);
                match test {
                    Test::True => candidates.iter().any(|c| c.as_bool() == Some(true)),
                    Test::False => candidates.iter().any(|c| c.as_bool() == Some(false)),
                    Test::Null => candidates.is_empty() || candidates.iter().any(|c| c.is_null()),
                    Test::NotNull => candidates.iter().any(|c| !c.is_null()),
                }
            }
            Condition::Like {
                field,
                pattern,
                negated,
            } => {
                let Some(regex) = self.pattern(pattern) else {
                    return false;
                };
                reach(record, field).into_iter().any(|candidate| {
                    text_of(candidate)
                        .is_some_and(|text| regex.is_match(&text.to_uppercase()) != *negated)
                })
            }
            Condition::In { field, values } => reach(record, field).into_iter().any(|candidate| {
                values
                    .iter()
                    .any(|value| compare(value, candidate) == Some(Ordering::Equal))
            }),
            Condition::Between { field, low, high } => {
                reach(record, field).into_iter().any(|candidate| {
                    compare(low, candidate).is_some_and(|ord| ord != Ordering::Less)
                        && compare(high, candidate).is_some_and(|ord| ord != Ordering::Greater)
                })
            }
            Condition::Not(inner) => !self.matches(inner, record),
            Condition::And(left, right) => self.matches(left, record) && self.matches(right, record),
            Condition::Or(left, right) => self.matches(left, record) || self.matches(right, record),
        }
    }

    /// Records satisfying `condition`, in input order.
    pub fn filter<'a, I>(&mut self, condition: &Condition, records: I) -> Vec<&'a Json>
    where
        I: IntoIterator<Item = &'a Json>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(condition, record))
            .collect()
    }

    fn pattern(&mut self, pattern: &str) -> Option<Regex> {
        if let Some(regex) = self.patterns.get(pattern) {
            return Some(regex.clone());
        }
        match Regex::new(&like_to_regex(pattern)) {
            Ok(regex) => {
                trace!("compiled LIKE pattern `{pattern}` as `{regex}`");
                self.patterns.insert(pattern.to_string(), regex.clone());
                Some(regex)
            }
            Err(e) => {
                warn!("unusable LIKE pattern `{pattern}`: {e}");
                None
            }
        }
    }
}

/// Evaluates `condition` against a single record.
pub fn matches(condition: &Condition, record: &Json) -> bool {
    Evaluator::new().matches(condition, record)
}

/// `%` matches any run of characters and `_` exactly one; everything else is
/// literal.
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::from("(?s)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if c == '%' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}

/// Values of `field` reachable from `record`.
fn reach<'a>(record: &'a Json, field: &FieldRef) -> Vec<&'a Json> {
    let mut contexts = vec![record];
    for segment in &field.path {
        let mut next = Vec::new();
        for context in contexts {
            match context.get(segment) {
                Some(Json::Array(items)) => next.extend(items.iter()),
                Some(Json::Null) | None => {}
                Some(value) => next.push(value),
            }
        }
        contexts = next;
    }
    contexts
        .into_iter()
        .map(|context| context.get(&field.name).unwrap_or(&NULL))
        .collect()
}

fn text_of(json: &Json) -> Option<String> {
    match json {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Orders the JSON `candidate` against `value`; `None` when they cannot be
/// compared.
fn compare(value: &Value, candidate: &Json) -> Option<Ordering> {
    match value {
        Value::Text(expected) => candidate.as_str().map(|s| s.cmp(expected.as_str())),
        Value::Enum { variant, .. } => candidate.as_str().map(|s| s.cmp(variant.as_str())),
        Value::Bool(expected) => candidate.as_bool().map(|b| b.cmp(expected)),
        Value::Uuid(expected) => candidate
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|u| u.cmp(expected)),
        Value::Date(expected) => candidate
            .as_str()
            .and_then(|s| parse_date(s).ok())
            .map(|d| d.cmp(expected)),
        Value::Time(expected) => candidate
            .as_str()
            .and_then(|s| parse_time(s).ok())
            .map(|t| t.cmp(expected)),
        Value::DateTime(expected) => candidate
            .as_str()
            .and_then(|s| parse_date_time(s).ok())
            .map(|dt| dt.cmp(expected)),
        Value::Zoned(_) | Value::Offset(_) | Value::Instant(_) | Value::Timestamp(_) => {
            let expected = value.as_instant()?;
            instant_of(candidate).map(|instant| instant.cmp(&expected))
        }
        _ => {
            let expected = value.as_decimal()?;
            decimal_of(candidate).map(|d| d.cmp(&expected))
        }
    }
}

/// RFC 3339 text, or the plain date-time pattern read in the local zone.
fn instant_of(json: &Json) -> Option<DateTime<Utc>> {
    let text = json.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = parse_date_time(text).ok()?;
    in_local_zone(naive).ok().map(|dt| dt.with_timezone(&Utc))
}

fn decimal_of(json: &Json) -> Option<Decimal> {
    match json {
        Json::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Json::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}
