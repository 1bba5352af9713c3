//! Execute select queries against JSON input

use tracing::debug;

use super::{CliError, convert::json_kind, define_json_getters};
use crate::{Database, Select, output::render_json};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The select statement to execute
    pub query: String,
    /// JSON input string: an array whose items become the entities
    pub input: Option<String>,
    /// Indent the rendered JSON
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed successfully; the matching entities in table order,
    /// rendered as a JSON array
    Success(String),
}

/// Execute a check operation
///
/// Only the base table exists, so the statement must select from `Entity`.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let select = Select::parse(&options.query)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let entities = match serde_json::from_str::<serde_json::Value>(json_str)? {
        serde_json::Value::Array(items) => items,
        other => return Err(CliError::NotAnArray(json_kind(&other))),
    };

    let mut db = Database::new(entities);
    let attributes = define_json_getters(&mut db);
    debug!(entities = db.entities().len(), ?attributes, "loaded JSON entities");

    let rows = db.select(&select)?;
    let matched = rows
        .iter()
        .map(|record| db.entities()[record.id()].clone())
        .collect();
    let rendered = render_json(&serde_json::Value::Array(matched), options.pretty)?;
    Ok(CheckResult::Success(rendered))
}
