//! The backend capability the compiler emits predicates through.

use crate::{schema::Introspect, value::Value};

/// Predicate-construction backend.
///
/// A sink owns a navigable root, can join into relationship segments and look
/// up terminal fields, and builds backend predicates for every operator of
/// the filter language. The compiler only ever calls into it; it never
/// inspects the predicates it gets back.
///
/// Joins created through [`PredicateSink::join`] are cached per compilation
/// by dotted prefix, so a sink sees at most one `join` call per prefix for a
/// given filter string.
pub trait PredicateSink {
    type Predicate;
    /// Navigation context: the root or one joined relationship segment
    type Join: Clone;
    /// Terminal field projected from a navigation context
    type Field;
    type Schema: Introspect + ?Sized;

    /// Schema used to find declared field types.
    fn schema(&self) -> &Self::Schema;

    fn root(&self) -> Self::Join;

    /// Entity type a navigation context ranges over.
    fn entity_type(&self, context: &Self::Join) -> String;

    /// Navigates from `context` into relationship `segment`.
    fn join(&mut self, context: &Self::Join, segment: &str) -> Option<Self::Join>;

    /// Terminal field `name` of `context`.
    fn field(&self, context: &Self::Join, name: &str) -> Option<Self::Field>;

    // Relational
    fn equal(&mut self, field: Self::Field, value: Value) -> Self::Predicate;
    fn not_equal(&mut self, field: Self::Field, value: Value) -> Self::Predicate;
    fn greater_than(&mut self, field: Self::Field, value: Value) -> Self::Predicate;
    fn greater_or_equal(&mut self, field: Self::Field, value: Value) -> Self::Predicate;
    fn less_than(&mut self, field: Self::Field, value: Value) -> Self::Predicate;
    fn less_or_equal(&mut self, field: Self::Field, value: Value) -> Self::Predicate;

    // Tests
    fn is_true(&mut self, field: Self::Field) -> Self::Predicate;
    fn is_false(&mut self, field: Self::Field) -> Self::Predicate;
    fn is_null(&mut self, field: Self::Field) -> Self::Predicate;
    fn is_not_null(&mut self, field: Self::Field) -> Self::Predicate;

    /// `upper(field) LIKE pattern`; `pattern` is already uppercase and uses
    /// `%` as the wildcard.
    fn upper_like(&mut self, field: Self::Field, pattern: String) -> Self::Predicate;
    fn upper_not_like(&mut self, field: Self::Field, pattern: String) -> Self::Predicate;

    /// Membership in `values`, kept in encounter order.
    fn is_in(&mut self, field: Self::Field, values: Vec<Value>) -> Self::Predicate;

    /// Inclusive range test.
    fn between(&mut self, field: Self::Field, low: Value, high: Value) -> Self::Predicate;

    // Combinators
    fn not(&mut self, predicate: Self::Predicate) -> Self::Predicate;
    fn and(&mut self, left: Self::Predicate, right: Self::Predicate) -> Self::Predicate;
    fn or(&mut self, left: Self::Predicate, right: Self::Predicate) -> Self::Predicate;
}
