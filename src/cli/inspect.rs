//! Token listings and syntax tree dumps

use crate::{
    ExpressionError, parse_expression, tokenize,
    output::{dump, dump_pretty, node_to_json, render_json},
};

use super::CliError;

/// How `ql ast` renders a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AstFormat {
    /// S-expression
    #[default]
    Sexpr,
    /// JSON object tree
    Json,
}

/// One line per token, end-of-file included.
pub fn list_tokens(expr: &str) -> Result<Vec<String>, CliError> {
    let tokens = tokenize(expr).map_err(ExpressionError::from)?;
    Ok(tokens.iter().map(|t| t.to_string()).collect())
}

/// Parses `expr` and renders its tree.
pub fn show_ast(expr: &str, format: AstFormat, pretty: bool) -> Result<String, CliError> {
    let node = parse_expression(expr)?;
    let rendered = match (format, pretty) {
        (AstFormat::Sexpr, false) => dump(&node),
        (AstFormat::Sexpr, true) => dump_pretty(&node),
        (AstFormat::Json, pretty) => render_json(&node_to_json(&node), pretty)?,
    };
    Ok(rendered)
}
