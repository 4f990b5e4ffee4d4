//! Keep the JSON records a filter matches

use log::debug;

use super::{CliError, compiler, load_schema};
use crate::{ConditionSink, Evaluator};

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub filter: String,
    /// Schema document (JSON text)
    pub schema: String,
    /// Entity type of the input records
    pub entity: String,
    /// `OLD=NEW` attribute renames
    pub renames: Vec<String>,
    /// JSON input: an array of records or a single record
    pub input: Option<String>,
}

/// Compiles the filter and returns the matching records in input order.
pub fn execute_filter(options: &FilterOptions) -> Result<Vec<serde_json::Value>, CliError> {
    let schema = load_schema(&options.schema, &options.entity)?;

    let compiler = compiler(&options.renames)?;
    let mut sink = ConditionSink::new(&schema, options.entity.as_str());
    let condition = compiler.compile(&mut sink, &options.filter)?;

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = match serde_json::from_str(json_str)? {
        serde_json::Value::Array(records) => records,
        record => vec![record],
    };

    let mut evaluator = Evaluator::new();
    let total = records.len();
    let kept: Vec<serde_json::Value> = records
        .into_iter()
        .filter(|record| evaluator.matches(&condition, record))
        .collect();
    debug!("{} of {total} record(s) matched `{condition}`", kept.len());
    Ok(kept)
}
