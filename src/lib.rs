pub mod ast;
pub mod compiler;
pub mod condition;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod schema;
pub mod sink;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Clause, Group, LogicalOp, Operand, Operator, Predicate, Token};
pub use compiler::{AttributeMapper, Compiler, compile};
pub use condition::{Condition, ConditionSink};
pub use convert::{ConverterRegistry, TypeFieldCache, ValueConverter, register_converter};
pub use error::{BoxError, CompileError, ConversionFailure, SyntaxError};
pub use evaluator::{Evaluator, matches};
pub use lexer::{Lexer, Position};
pub use output::{to_json, to_json_pretty};
pub use parser::{Parser, parse};
pub use schema::{EntityType, FieldType, Introspect, Schema, SchemaError};
pub use sink::PredicateSink;
pub use value::Value;
