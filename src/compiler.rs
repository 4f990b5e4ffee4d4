use log::{debug, trace};

use crate::{
    ast::{Clause, Group, LogicalOp, Operand, Operator, Predicate},
    convert::{ConverterRegistry, TypeFieldCache, ValueConverter},
    error::{CompileError, SyntaxError},
    parser,
    resolver::{PathResolver, ResolvedPath},
    sink::PredicateSink,
    value::Value,
};

/// Rewrites attribute paths before they are resolved.
pub type AttributeMapper = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Compiles filter strings into backend predicates.
///
/// A compiler holds configuration only. Every call to [`Compiler::compile`]
/// parses into a fresh clause tree and resolves paths with a fresh join cache,
/// so one compiler may serve concurrent callers.
///
/// # Examples
///
/// ```
/// use sieve_lang::{Compiler, ConditionSink, EntityType, FieldType, Schema};
///
/// let schema = Schema::new().with_entity(
///     EntityType::new("Author")
///         .field("first_name", FieldType::Text)
///         .field("age", FieldType::I32),
/// );
///
/// let compiler = Compiler::new()
///     .with_attribute_mapper(|path| path.replace("firstName", "first_name"));
/// let mut sink = ConditionSink::new(&schema, "Author");
/// let condition = compiler
///     .compile(&mut sink, "firstName = 'Charles' && age >= 30")
///     .unwrap();
/// assert_eq!(condition.to_string(), "(first_name = 'Charles' AND age >= 30)");
/// ```
pub struct Compiler<'r> {
    converters: &'r ConverterRegistry,
    field_types: &'r TypeFieldCache,
    attribute_mapper: Option<AttributeMapper>,
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler<'static> {
    /// A compiler using the global converter registry and field type cache.
    pub fn new() -> Self {
        Compiler {
            converters: ConverterRegistry::global(),
            field_types: TypeFieldCache::global(),
            attribute_mapper: None,
        }
    }
}

impl<'r> Compiler<'r> {
    /// Applies `mapper` to every attribute path before resolution.
    pub fn with_attribute_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.attribute_mapper = Some(Box::new(mapper));
        self
    }

    pub fn with_converters<'a>(self, converters: &'a ConverterRegistry) -> Compiler<'a>
    where
        'r: 'a,
    {
        Compiler {
            converters,
            field_types: self.field_types,
            attribute_mapper: self.attribute_mapper,
        }
    }

    pub fn with_field_types<'a>(self, field_types: &'a TypeFieldCache) -> Compiler<'a>
    where
        'r: 'a,
    {
        Compiler {
            converters: self.converters,
            field_types,
            attribute_mapper: self.attribute_mapper,
        }
    }

    /// Parses `query` and reduces it to one predicate built by `sink`.
    pub fn compile<S: PredicateSink>(
        &self,
        sink: &mut S,
        query: &str,
    ) -> Result<S::Predicate, CompileError> {
        debug!("compiling filter `{query}`");
        let group = parser::parse(query)?;
        self.reduce(sink, &group)
    }

    /// Reduces an already parsed clause tree.
    pub fn reduce<S: PredicateSink>(
        &self,
        sink: &mut S,
        group: &Group,
    ) -> Result<S::Predicate, CompileError> {
        let mut reducer = Reducer {
            converter: ValueConverter::new(self.converters, self.field_types),
            mapper: self.attribute_mapper.as_ref(),
            paths: PathResolver::new(),
            sink,
        };
        let predicate = reducer.group(group)?;
        debug!("filter `{group}` used {} join(s)", reducer.paths.join_count());
        Ok(predicate)
    }
}

/// Compiles `query` with the global registries and no attribute mapper.
pub fn compile<S: PredicateSink>(sink: &mut S, query: &str) -> Result<S::Predicate, CompileError> {
    Compiler::new().compile(sink, query)
}

/// Per-call reduction state.
struct Reducer<'c, 'r, S: PredicateSink> {
    converter: ValueConverter<'r>,
    mapper: Option<&'c AttributeMapper>,
    paths: PathResolver<S::Join>,
    sink: &'c mut S,
}

impl<S: PredicateSink> Reducer<'_, '_, S> {
    /// Folds the group's clauses from left to right: `a OP1 b OP2 c` becomes
    /// `OP2(OP1(a, b), c)` whatever the operators are.
    fn group(&mut self, group: &Group) -> Result<S::Predicate, CompileError> {
        let mut folded = self.clause(group.first())?;

        for (op, clause) in group.rest() {
            let right = self.clause(clause)?;
            trace!("folding {op} {clause}");
            folded = match op {
                LogicalOp::And => self.sink.and(folded, right),
                LogicalOp::Or => self.sink.or(folded, right),
            };
        }
        Ok(folded)
    }

    fn clause(&mut self, clause: &Clause) -> Result<S::Predicate, CompileError> {
        match clause {
            Clause::Predicate(predicate) => self.predicate(predicate),
            Clause::Group(group) => self.group(group),
        }
    }

    fn predicate(&mut self, predicate: &Predicate) -> Result<S::Predicate, CompileError> {
        trace!("compiling predicate `{predicate}`");
        let path = match self.mapper {
            Some(mapper) => mapper(&predicate.path),
            None => predicate.path.clone(),
        };
        let resolved = self
            .paths
            .resolve(&mut *self.sink, self.converter.field_types(), &path)?;

        let built = match predicate.operator {
            Operator::Equal
            | Operator::NotEqual
            | Operator::GreaterThan
            | Operator::GreaterEqual
            | Operator::LessThan
            | Operator::LessEqual => {
                let value = self.last_value(&resolved, predicate)?;
                let field = resolved.field;
                match predicate.operator {
                    Operator::Equal => self.sink.equal(field, value),
                    Operator::NotEqual => self.sink.not_equal(field, value),
                    Operator::GreaterThan => self.sink.greater_than(field, value),
                    Operator::GreaterEqual => self.sink.greater_or_equal(field, value),
                    Operator::LessThan => self.sink.less_than(field, value),
                    _ => self.sink.less_or_equal(field, value),
                }
            }
            Operator::IsTrue => self.sink.is_true(resolved.field),
            Operator::IsFalse => self.sink.is_false(resolved.field),
            Operator::IsNull => self.sink.is_null(resolved.field),
            Operator::IsNotNull => self.sink.is_not_null(resolved.field),
            Operator::Contains => {
                let pattern = format!("%{}%", pattern_text(predicate)?);
                self.sink.upper_like(resolved.field, pattern)
            }
            Operator::Starts => {
                let pattern = format!("{}%", pattern_text(predicate)?);
                self.sink.upper_like(resolved.field, pattern)
            }
            Operator::NotContains => {
                let pattern = format!("%{}%", pattern_text(predicate)?);
                self.sink.upper_not_like(resolved.field, pattern)
            }
            Operator::NotStarts => {
                let pattern = format!("{}%", pattern_text(predicate)?);
                self.sink.upper_not_like(resolved.field, pattern)
            }
            Operator::In => {
                let values = self.values(&resolved, &predicate.operands)?;
                self.sink.is_in(resolved.field, values)
            }
            Operator::NotIn => {
                let values = self.values(&resolved, &predicate.operands)?;
                let membership = self.sink.is_in(resolved.field, values);
                self.sink.not(membership)
            }
            Operator::Between => {
                let [.., low, high] = predicate.operands.as_slice() else {
                    return Err(malformed(predicate, "'between' needs a low and a high bound"));
                };
                let low = self.value(&resolved, low)?;
                let high = self.value(&resolved, high)?;
                self.sink.between(resolved.field, low, high)
            }
        };
        Ok(built)
    }

    fn value(&self, resolved: &ResolvedPath<S>, operand: &Operand) -> Result<Value, CompileError> {
        self.converter.convert_to(
            self.sink.schema(),
            &resolved.field_type,
            &resolved.field_name,
            operand.text(),
        )
    }

    fn values(
        &self,
        resolved: &ResolvedPath<S>,
        operands: &[Operand],
    ) -> Result<Vec<Value>, CompileError> {
        operands
            .iter()
            .map(|operand| self.value(resolved, operand))
            .collect()
    }

    fn last_value(
        &self,
        resolved: &ResolvedPath<S>,
        predicate: &Predicate,
    ) -> Result<Value, CompileError> {
        let operand = predicate
            .operands
            .last()
            .ok_or_else(|| malformed(predicate, format!("'{}' needs a value", predicate.operator)))?;
        self.value(resolved, operand)
    }
}

/// Uppercased string operand of a matching operator.
fn pattern_text(predicate: &Predicate) -> Result<String, CompileError> {
    match predicate.operands.last() {
        Some(Operand::String(text)) => Ok(text.to_uppercase()),
        _ => Err(malformed(
            predicate,
            format!("'{}' needs a string", predicate.operator),
        )),
    }
}

fn malformed(predicate: &Predicate, message: impl Into<String>) -> CompileError {
    SyntaxError::new(predicate.position, message).into()
}
