//! CLI support for sieve-lang
//!
//! The `check` and `filter` commands are exposed as plain functions so they
//! can be embedded in other tools.

mod check;
mod filter;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use filter::{FilterOptions, execute_filter};

use std::io;

use crate::{CompileError, Compiler, Schema, SchemaError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Filter failed to parse or compile
    Compile(CompileError),
    /// Schema document is malformed
    Schema(SchemaError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// A command needing a schema was run without one
    MissingSchema,
    /// Root entity type is not declared in the schema
    UnknownEntity(String),
    /// `--rename` argument without `=`
    InvalidRename(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Compile(e) => write!(f, "{}", e),
            CliError::Schema(e) => write!(f, "Invalid schema: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Use --input or pipe JSON to stdin."),
            CliError::MissingSchema => write!(f, "A schema is required. Use --schema <FILE>."),
            CliError::UnknownEntity(name) => {
                write!(f, "Unknown entity type: '{}'", name)
            }
            CliError::InvalidRename(arg) => {
                write!(f, "Invalid rename '{}': expected OLD=NEW", arg)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Compile(e) => Some(e),
            CliError::Schema(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        CliError::Compile(e)
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        CliError::Schema(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Reads a schema document and checks that `entity` is declared in it.
pub fn load_schema(document: &str, entity: &str) -> Result<Schema, CliError> {
    let json: serde_json::Value = serde_json::from_str(document)?;
    let schema = Schema::from_json(&json)?;
    if !schema.has_entity(entity) {
        return Err(CliError::UnknownEntity(entity.to_string()));
    }
    Ok(schema)
}

/// Splits `OLD=NEW` rename arguments.
pub fn parse_renames(args: &[String]) -> Result<Vec<(String, String)>, CliError> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((old, new)) if !old.is_empty() && !new.is_empty() => {
                Ok((old.to_string(), new.to_string()))
            }
            _ => Err(CliError::InvalidRename(arg.clone())),
        })
        .collect()
}

/// Replaces a leading path or path prefix with its new name. The first
/// matching rename wins.
pub fn rename_path(renames: &[(String, String)], path: &str) -> String {
    for (old, new) in renames {
        if path == old {
            return new.clone();
        }
        if let Some(rest) = path.strip_prefix(old.as_str())
            && rest.starts_with('.')
        {
            return format!("{new}{rest}");
        }
    }
    path.to_string()
}

fn compiler(renames: &[String]) -> Result<Compiler<'static>, CliError> {
    let renames = parse_renames(renames)?;
    if renames.is_empty() {
        return Ok(Compiler::new());
    }
    Ok(Compiler::new().with_attribute_mapper(move |path| rename_path(&renames, path)))
}
