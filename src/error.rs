//! Error types shared by the lexer, parser and compiler.

use thiserror::Error;

use crate::{lexer::Position, schema::FieldType};

/// Boxed error returned by converter functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Malformed token stream or grammar violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse at line {line} and column {column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        SyntaxError {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }
}

/// Errors that abort a compilation. No partial predicate is ever produced.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Unknown relationship or attribute segment
    #[error("Cannot resolve '{segment}' in attribute path '{path}'")]
    SchemaResolution { path: String, segment: String },

    /// The literal cannot become a value of the field's declared type
    #[error("Cannot convert '{literal}' to {target_type} for field '{field_name}': {cause}")]
    Conversion {
        target_type: FieldType,
        field_name: String,
        literal: String,
        #[source]
        cause: BoxError,
    },
}

impl CompileError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, CompileError::Syntax(_))
    }

    pub fn is_schema_resolution(&self) -> bool {
        matches!(self, CompileError::SchemaResolution { .. })
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, CompileError::Conversion { .. })
    }
}

/// Why a conversion failed when no parse error from a converter is involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    #[error("no converter registered for {0}")]
    MissingConverter(FieldType),

    #[error("enum {0} is not declared in the schema")]
    UnknownEnum(String),

    #[error("'{variant}' is not a variant of {enum_name}")]
    UnknownVariant { enum_name: String, variant: String },

    #[error("expected 'true' or 'false'")]
    InvalidBool,

    #[error("local time {0} does not exist in the system time zone")]
    NonexistentLocalTime(String),
}
