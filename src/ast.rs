//! # Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree of the where-clause
//! expression language, and the `select` statement that wraps it.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[node]** - Expression nodes, one variant per grammar production
//! - **[operators]** - Unary and binary operators
//! - **[query]** - The `select <table> <var> where <expr>` statement
//!
//! ## Quick Start
//!
//! ```text
//! select BinaryExpr n where n.op == '!=' and n.lhs != 'x'
//! ```
//!
//! This query draws rows from the `BinaryExpr` table, binds each row to `n`
//! and keeps the rows whose `op` getter yields `'!='`.
//!
//! ## Precedence
//!
//! From loosest to tightest binding:
//!
//! ```text
//! c ? a : b            ternary
//! ||  or               disjunction
//! &&  and              conjunction
//! ==  !=  >=  >  <=  < comparison
//! +   -                sum
//! *   /   %            term
//! -x  !x               unary
//! x(..) x[..] x.key    postfix
//! ```
//!
//! Every binary level is left-associative.
pub mod node;
pub mod operators;
pub mod query;
pub mod tokens;

pub use node::Node;
pub use operators::{BinOp, UnaryOp};
pub use query::Select;
pub use tokens::{Token, TokenKind};
