use std::sync::LazyLock;

use regex::Regex;

use crate::ast::Node;
use crate::database::QueryError;
use crate::parse_expression;

static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*select\s+(\S+)\s+(\S+)(?:\s+where(?:\s+(.*?))?)?\s*$")
        .expect("select statement pattern is valid")
});

/// A parsed `select <table> <var> [where <expr>]` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Table the rows are drawn from
    pub table: String,

    /// Name the where-clause uses for the current row
    pub var: String,

    /// Filter expression. `None` selects every row.
    pub filter: Option<Node>,
}

impl Select {
    /// Splits a query statement and parses its where-clause.
    ///
    /// # Examples
    ///
    /// ```
    /// use ql_lang::ast::Select;
    ///
    /// let select = Select::parse("select EvenNumber n where n.num > 40").unwrap();
    /// assert_eq!(select.table, "EvenNumber");
    /// assert_eq!(select.var, "n");
    /// assert!(select.filter.is_some());
    ///
    /// let all = Select::parse("select Entity e").unwrap();
    /// assert!(all.filter.is_none());
    /// ```
    pub fn parse(query: &str) -> Result<Select, QueryError> {
        Statement::split(query)?.into_select()
    }
}

/// A statement split into its parts, with the where-clause still unparsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Statement<'q> {
    pub table: &'q str,
    pub var: &'q str,
    pub clause: Option<&'q str>,
}

impl<'q> Statement<'q> {
    pub(crate) fn split(query: &'q str) -> Result<Self, QueryError> {
        let caps = SELECT_RE
            .captures(query)
            .ok_or_else(|| QueryError::Syntax(query.to_string()))?;

        let (Some(table), Some(var)) = (caps.get(1), caps.get(2)) else {
            return Err(QueryError::Syntax(query.to_string()));
        };
        let (table, var) = (table.as_str(), var.as_str());
        if !is_name(table) || !is_name(var) {
            return Err(QueryError::Syntax(query.to_string()));
        }

        let clause = caps
            .get(3)
            .map(|m| m.as_str())
            .filter(|expr| !expr.trim().is_empty());
        Ok(Statement { table, var, clause })
    }

    pub(crate) fn into_select(self) -> Result<Select, QueryError> {
        let filter = self.clause.map(parse_expression).transpose()?;
        Ok(Select {
            table: self.table.to_string(),
            var: self.var.to_string(),
            filter,
        })
    }
}

/// Table and variable names: identifiers other than the `where` keyword.
fn is_name(s: &str) -> bool {
    is_identifier(s) && s != "where"
}

/// Same shape the lexer accepts for identifiers: an ASCII letter, then ASCII
/// letters or digits.
pub fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => bytes.all(|b| b.is_ascii_alphanumeric()),
        _ => false,
    }
}

#[test]
fn test_trailing_where_without_expression() {
    let select = Select::parse("select Entity e where").unwrap();
    assert_eq!(select.table, "Entity");
    assert!(select.filter.is_none());
}

#[test]
fn test_where_is_not_a_name() {
    assert!(matches!(Select::parse("select Entity where"), Err(QueryError::Syntax(_))));
    assert!(matches!(Select::parse("select where n"), Err(QueryError::Syntax(_))));
    assert!(Select::parse("select Entity wherever").is_ok());
}

#[test]
fn test_split_leaves_clause_unparsed() {
    let stmt = Statement::split("select Missing n where )").unwrap();
    assert_eq!(stmt.table, "Missing");
    assert_eq!(stmt.clause, Some(")"));
    assert!(matches!(stmt.into_select(), Err(QueryError::Expression(_))));
}

#[test]
fn test_rejects_wrong_word_count() {
    assert!(matches!(Select::parse("select Entity"), Err(QueryError::Syntax(_))));
    assert!(matches!(Select::parse("select Entity e x"), Err(QueryError::Syntax(_))));
    assert!(matches!(Select::parse("from Entity e select e"), Err(QueryError::Syntax(_))));
    assert!(matches!(Select::parse("select 1abc e"), Err(QueryError::Syntax(_))));
}
