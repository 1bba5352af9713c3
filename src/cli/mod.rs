//! CLI support for ql-lang
//!
//! Provides programmatic access to the `ql` commands so they can be embedded
//! in other tools and tested without spawning a process.

mod check;
mod convert;
mod inspect;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{define_json_getters, json_to_value};
pub use inspect::{AstFormat, list_tokens, show_ast};

use std::io;

use thiserror::Error;

use crate::{ExpressionError, QueryError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed statement, unknown table or failed evaluation
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Expression failed to tokenize or parse
    #[error("Syntax error: {0}")]
    Expression(#[from] ExpressionError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// Input is valid JSON but not an array of entities
    #[error("Input must be a JSON array, found {0}")]
    NotAnArray(&'static str),
}
