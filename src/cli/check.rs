//! Validate filters and print what they compile to

use super::{CliError, compiler, load_schema};
use crate::{ConditionSink, output::condition_to_json, parse};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter to check
    pub filter: String,
    /// Schema document (JSON text)
    pub schema: Option<String>,
    /// Root entity type the filter applies to
    pub entity: String,
    /// `OLD=NEW` attribute renames
    pub renames: Vec<String>,
    /// Only validate syntax, don't compile
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Filter compiled; the condition tree and the joins it needs
    Compiled {
        condition: serde_json::Value,
        joins: usize,
    },
}

/// Execute a sieve check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.syntax_only {
        parse(&options.filter).map_err(|e| CliError::Compile(e.into()))?;
        return Ok(CheckResult::SyntaxValid);
    }

    let document = options.schema.as_ref().ok_or(CliError::MissingSchema)?;
    let schema = load_schema(document, &options.entity)?;

    let compiler = compiler(&options.renames)?;
    let mut sink = ConditionSink::new(&schema, options.entity.as_str());
    let condition = compiler.compile(&mut sink, &options.filter)?;

    Ok(CheckResult::Compiled {
        condition: condition_to_json(&condition),
        joins: sink.joins().len(),
    })
}
