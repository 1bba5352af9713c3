pub mod ast;
pub mod cli;
pub mod database;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Node, Select, Token, TokenKind, UnaryOp};
pub use database::{BASE_TABLE, Database, Getter, QueryError, Record, StringPool, Table};
pub use evaluator::{EvaluationFault, Evaluator, evaluate};
pub use lexer::{LexError, Lexer, tokenize};
pub use output::{dump, dump_pretty};
pub use parser::{ExpressionError, ParseError, Parser, parse, parse_expression};
pub use value::Value;
