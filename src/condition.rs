//! Reference [`PredicateSink`] producing an inspectable condition tree.
//!
//! [`ConditionSink`] checks paths against a [`Schema`], records every join it
//! is asked to create, and builds [`Condition`] values that can be printed,
//! rendered as JSON, or evaluated against JSON records with the
//! [`Evaluator`](crate::evaluator::Evaluator).

use std::{cmp::Ordering, fmt};

use crate::{
    schema::{Introspect, Schema},
    sink::PredicateSink,
    value::Value,
};

/// A terminal field reached from the root entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    /// Relationship segments traversed from the root
    pub path: Vec<String>,
    pub name: String,
    /// Join the field is projected from; `None` for the root
    pub join: Option<usize>,
}

impl FieldRef {
    pub fn dotted(&self) -> String {
        let mut dotted = self.path.join(".");
        if !dotted.is_empty() {
            dotted.push('.');
        }
        dotted.push_str(&self.name);
        dotted
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
}

impl CompareOp {
    /// Whether a field that orders as `ordering` against the operand passes.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::LessEqual => ordering != Ordering::Greater,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Test {
    True,
    False,
    Null,
    NotNull,
}

impl Test {
    pub fn symbol(self) -> &'static str {
        match self {
            Test::True => "IS TRUE",
            Test::False => "IS FALSE",
            Test::Null => "IS NULL",
            Test::NotNull => "IS NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: FieldRef,
        op: CompareOp,
        value: Value,
    },
    Test {
        field: FieldRef,
        test: Test,
    },
    /// `UPPER(field) [NOT] LIKE pattern`
    Like {
        field: FieldRef,
        pattern: String,
        negated: bool,
    },
    In {
        field: FieldRef,
        values: Vec<Value>,
    },
    /// Inclusive on both ends
    Between {
        field: FieldRef,
        low: Value,
        high: Value,
    },
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Number of atomic conditions in the tree.
    pub fn atoms(&self) -> usize {
        match self {
            Condition::Not(inner) => inner.atoms(),
            Condition::And(left, right) | Condition::Or(left, right) => left.atoms() + right.atoms(),
            _ => 1,
        }
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    write!(f, "({})", items.join(", "))
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { field, op, value } => {
                write!(f, "{field} {} {value}", op.symbol())
            }
            Condition::Test { field, test } => write!(f, "{field} {}", test.symbol()),
            Condition::Like {
                field,
                pattern,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "UPPER({field}) {not}LIKE '{pattern}'")
            }
            Condition::In { field, values } => {
                write!(f, "{field} IN ")?;
                write_values(f, values)
            }
            Condition::Between { field, low, high } => {
                write!(f, "{field} BETWEEN {low} AND {high}")
            }
            Condition::Not(inner) => write!(f, "NOT ({inner})"),
            Condition::And(left, right) => write!(f, "({left} AND {right})"),
            Condition::Or(left, right) => write!(f, "({left} OR {right})"),
        }
    }
}

/// A join created during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRecord {
    pub id: usize,
    /// Join navigated from; `None` for the root
    pub parent: Option<usize>,
    pub segment: String,
    /// Entity type the join ranges over
    pub entity: String,
}

/// Navigation context of a [`ConditionSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub id: Option<usize>,
    pub entity: String,
    pub path: Vec<String>,
}

pub struct ConditionSink<'s> {
    schema: &'s Schema,
    root_type: String,
    joins: Vec<JoinRecord>,
}

impl<'s> ConditionSink<'s> {
    pub fn new(schema: &'s Schema, root_type: impl Into<String>) -> Self {
        ConditionSink {
            schema,
            root_type: root_type.into(),
            joins: Vec::new(),
        }
    }

    /// Joins created so far, in creation order.
    pub fn joins(&self) -> &[JoinRecord] {
        &self.joins
    }

    fn compare(&self, field: FieldRef, op: CompareOp, value: Value) -> Condition {
        Condition::Compare { field, op, value }
    }
}

impl PredicateSink for ConditionSink<'_> {
    type Predicate = Condition;
    type Join = Join;
    type Field = FieldRef;
    type Schema = Schema;

    fn schema(&self) -> &Schema {
        self.schema
    }

    fn root(&self) -> Join {
        Join {
            id: None,
            entity: self.root_type.clone(),
            path: Vec::new(),
        }
    }

    fn entity_type(&self, context: &Join) -> String {
        context.entity.clone()
    }

    fn join(&mut self, context: &Join, segment: &str) -> Option<Join> {
        let ty = self.schema.field_type(&context.entity, segment)?;
        let entity = ty.target_entity()?.to_string();

        let id = self.joins.len();
        self.joins.push(JoinRecord {
            id,
            parent: context.id,
            segment: segment.to_string(),
            entity: entity.clone(),
        });

        let mut path = context.path.clone();
        path.push(segment.to_string());
        Some(Join {
            id: Some(id),
            entity,
            path,
        })
    }

    fn field(&self, context: &Join, name: &str) -> Option<FieldRef> {
        self.schema.field_type(&context.entity, name)?;
        Some(FieldRef {
            path: context.path.clone(),
            name: name.to_string(),
            join: context.id,
        })
    }

    fn equal(&mut self, field: FieldRef, value: Value) -> Condition {
        self.compare(field, CompareOp::Equal, value)
    }

    fn not_equal(&mut self, field: FieldRef, value: Value) -> Condition {
        self.compare(field, CompareOp::NotEqual, value)
    }

    fn greater_than(&mut self, field: FieldRef, value: Value) -> Condition {
        self.compare(field, CompareOp::GreaterThan, value)
    }

    fn greater_or_equal(&mut self, field: FieldRef, value: Value) -> Condition {
        self.compare(field, CompareOp::GreaterEqual, value)
    }

    fn less_than(&mut self, field: FieldRef, value: Value) -> Condition {
        self.compare(field, CompareOp::LessThan, value)
    }

    fn less_or_equal(&mut self, field: FieldRef, value: Value) -> Condition {
        self.compare(field, CompareOp::LessEqual, value)
    }

    fn is_true(&mut self, field: FieldRef) -> Condition {
        Condition::Test {
            field,
            test: Test::True,
        }
    }

    fn is_false(&mut self, field: FieldRef) -> Condition {
        Condition::Test {
            field,
            test: Test::False,
        }
    }

    fn is_null(&mut self, field: FieldRef) -> Condition {
        Condition::Test {
            field,
            test: Test::Null,
        }
    }

    fn is_not_null(&mut self, field: FieldRef) -> Condition {
        Condition::Test {
            field,
            test: Test::NotNull,
        }
    }

    fn upper_like(&mut self, field: FieldRef, pattern: String) -> Condition {
        Condition::Like {
            field,
            pattern,
            negated: false,
        }
    }

    fn upper_not_like(&mut self, field: FieldRef, pattern: String) -> Condition {
        Condition::Like {
            field,
            pattern,
            negated: true,
        }
    }

    fn is_in(&mut self, field: FieldRef, values: Vec<Value>) -> Condition {
        Condition::In { field, values }
    }

    fn between(&mut self, field: FieldRef, low: Value, high: Value) -> Condition {
        Condition::Between { field, low, high }
    }

    fn not(&mut self, predicate: Condition) -> Condition {
        Condition::not(predicate)
    }

    fn and(&mut self, left: Condition, right: Condition) -> Condition {
        Condition::and(left, right)
    }

    fn or(&mut self, left: Condition, right: Condition) -> Condition {
        Condition::or(left, right)
    }
}
