use std::collections::HashSet;

use thiserror::Error;
use tracing::error;

use crate::{
    ast::{BinOp, Node, UnaryOp},
    database::{Getter, Record, Table},
    value::Value,
};

/// Conditions that abort evaluation of a where-clause.
///
/// These are never recovered from inside the evaluator. They travel up to
/// [`evaluate`], which logs them and hands them back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationFault {
    /// An identifier other than the query's own variable
    #[error("unbound identifier {name} (query variable is {var})")]
    UnboundIdentifier { name: String, var: String },

    /// A selector whose target is not the query variable
    #[error("invalid selector target: {0}")]
    InvalidSelectorTarget(&'static str),

    /// `var.key` with no getter named `key` on the table
    #[error("table {table} has no attribute {key}")]
    UndefinedGetter { table: String, key: String },

    /// Operands of different kinds
    #[error("cannot compare {lhs} {op} {rhs}")]
    TypeMismatch {
        op: BinOp,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// The operator exists but not for these operands
    #[error("operator {op} is not defined for {kind}")]
    UndefinedOperator { op: &'static str, kind: &'static str },

    /// A record identity with no entity behind it in the supplied collection
    #[error("table {table} has no entity for record {id}")]
    MissingEntity { table: String, id: usize },

    /// A node kind that has no meaning in this position
    #[error("{kind} expression is not supported as a {position}")]
    Unsupported {
        kind: &'static str,
        position: &'static str,
    },
}

/// Produces a value for a row: either a table getter or a constant.
enum Extractor<'a, T> {
    Getter(&'a Getter<T>),
    Constant(Value),
}

impl<T> Extractor<'_, T> {
    fn extract(&self, entity: &T) -> Value {
        match self {
            Extractor::Getter(getter) => (**getter)(entity),
            Extractor::Constant(value) => value.clone(),
        }
    }
}

/// Set-oriented where-clause evaluator for one table and one bound variable.
///
/// Every condition maps a candidate list of records to the sub-list that
/// satisfies it, preserving candidate order.
pub struct Evaluator<'a, 'q, T> {
    table: &'a Table<T>,
    entities: &'a [T],
    var: &'q str,
}

impl<'a, 'q, T> Evaluator<'a, 'q, T> {
    /// `entities` is the collection the table's record identities index. A
    /// record whose identity is out of range faults with
    /// [`EvaluationFault::MissingEntity`] when a comparison reaches it.
    pub fn new(table: &'a Table<T>, entities: &'a [T], var: &'q str) -> Self {
        Evaluator {
            table,
            entities,
            var,
        }
    }

    /// Narrows `candidates` to the records satisfying `node`.
    pub fn eval_set(
        &self,
        node: &Node,
        candidates: Vec<&'a Record>,
    ) -> Result<Vec<&'a Record>, EvaluationFault> {
        match node {
            // The bare variable selects every row.
            Node::Ident(name) => {
                if name == self.var {
                    Ok(candidates)
                } else {
                    Err(self.unbound(name))
                }
            }
            Node::Paren(inner) => self.eval_set(inner, candidates),
            Node::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let selected: HashSet<usize> = self
                    .eval_set(operand, candidates.clone())?
                    .iter()
                    .map(|record| record.id())
                    .collect();
                Ok(candidates
                    .into_iter()
                    .filter(|record| !selected.contains(&record.id()))
                    .collect())
            }
            Node::Unary { op, .. } => Err(EvaluationFault::UndefinedOperator {
                op: op.symbol(),
                kind: "conditions",
            }),
            Node::Binary {
                op: BinOp::And,
                lhs,
                rhs,
            } => {
                let left = self.eval_set(lhs, candidates)?;
                self.eval_set(rhs, left)
            }
            Node::Binary {
                op: BinOp::Or,
                lhs,
                rhs,
            } => {
                let left = self.eval_set(lhs, candidates.clone())?;
                let right = self.eval_set(rhs, candidates)?;

                let mut seen: HashSet<usize> = left.iter().map(|record| record.id()).collect();
                let mut result = left;
                for record in right {
                    if seen.insert(record.id()) {
                        result.push(record);
                    }
                }
                Ok(result)
            }
            Node::Binary { op, lhs, rhs } if op.is_comparison() => {
                let lhs = self.eval_value(lhs)?;
                let rhs = self.eval_value(rhs)?;

                let mut result = Vec::with_capacity(candidates.len());
                for record in candidates {
                    let entity = self.entity(record)?;
                    if compare(*op, &lhs.extract(entity), &rhs.extract(entity))? {
                        result.push(record);
                    }
                }
                Ok(result)
            }
            Node::Binary { op, .. } => Err(EvaluationFault::UndefinedOperator {
                op: op.symbol(),
                kind: "conditions",
            }),
            other => Err(EvaluationFault::Unsupported {
                kind: other.kind(),
                position: "condition",
            }),
        }
    }

    fn eval_value(&self, node: &Node) -> Result<Extractor<'a, T>, EvaluationFault> {
        match node {
            Node::Selector { target, key } => match target.as_deref() {
                Some(Node::Ident(name)) if name == self.var => self
                    .table
                    .getter(key)
                    .map(Extractor::Getter)
                    .ok_or_else(|| EvaluationFault::UndefinedGetter {
                        table: self.table.name().to_string(),
                        key: key.clone(),
                    }),
                Some(Node::Ident(name)) => Err(self.unbound(name)),
                Some(other) => Err(EvaluationFault::InvalidSelectorTarget(other.kind())),
                None => Err(EvaluationFault::InvalidSelectorTarget("missing")),
            },
            Node::String(text) => Ok(Extractor::Constant(Value::Str(unquote(text)))),
            // Non-numeric text, including fractional literals, reads as zero.
            Node::Number(text) => Ok(Extractor::Constant(Value::Int(text.parse().unwrap_or(0)))),
            Node::Paren(inner) => self.eval_value(inner),
            other => Err(EvaluationFault::Unsupported {
                kind: other.kind(),
                position: "value",
            }),
        }
    }

    fn entity(&self, record: &Record) -> Result<&'a T, EvaluationFault> {
        self.entities
            .get(record.id())
            .ok_or_else(|| EvaluationFault::MissingEntity {
                table: self.table.name().to_string(),
                id: record.id(),
            })
    }

    fn unbound(&self, name: &str) -> EvaluationFault {
        EvaluationFault::UnboundIdentifier {
            name: name.to_string(),
            var: self.var.to_string(),
        }
    }
}

/// Compares two values of the same kind.
///
/// Integers support every comparison operator, strings only equality and
/// inequality, booleans none.
fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<bool, EvaluationFault> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => match op {
            BinOp::Equal => Ok(a == b),
            BinOp::NotEqual => Ok(a != b),
            BinOp::LessThan => Ok(a < b),
            BinOp::GreaterThan => Ok(a > b),
            BinOp::LessEqual => Ok(a <= b),
            BinOp::GreaterEqual => Ok(a >= b),
            _ => Err(EvaluationFault::UndefinedOperator {
                op: op.symbol(),
                kind: "int",
            }),
        },
        (Value::Str(a), Value::Str(b)) => match op {
            BinOp::Equal => Ok(a == b),
            BinOp::NotEqual => Ok(a != b),
            _ => Err(EvaluationFault::UndefinedOperator {
                op: op.symbol(),
                kind: "string",
            }),
        },
        (Value::Bool(_), Value::Bool(_)) => Err(EvaluationFault::UndefinedOperator {
            op: op.symbol(),
            kind: "bool",
        }),
        (a, b) => Err(EvaluationFault::TypeMismatch {
            op,
            lhs: a.type_name(),
            rhs: b.type_name(),
        }),
    }
}

/// Text of a string literal token without its quotes, with `\'` read as `'`.
///
/// Other escapes are kept as written.
pub fn unquote(literal: &str) -> String {
    let body = literal.strip_prefix('\'').unwrap_or(literal);
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            },
            '\'' => break,
            _ => result.push(ch),
        }
    }
    result
}

/// Evaluates a where-clause against every record of `table`.
///
/// With no clause every record is returned in table order. This is the only
/// place a fault leaves the evaluator; it is logged here and returned.
pub fn evaluate<'a, T>(
    table: &'a Table<T>,
    entities: &'a [T],
    var: &str,
    filter: Option<&Node>,
) -> Result<Vec<&'a Record>, EvaluationFault> {
    let all: Vec<&'a Record> = table.records().iter().collect();
    let Some(node) = filter else {
        return Ok(all);
    };

    Evaluator::new(table, entities, var)
        .eval_set(node, all)
        .inspect_err(|fault| {
            error!(table = table.name(), var, %fault, "fatal evaluation fault");
        })
}

#[test]
fn test_unquote() {
    assert_eq!(unquote("'binary'"), "binary");
    assert_eq!(unquote("''"), "");
    assert_eq!(unquote(r"'it\'s'"), "it's");
    assert_eq!(unquote(r"'a\nb'"), r"a\nb");
    assert_eq!(unquote("'open"), "open");
}

#[test]
fn test_compare_rules() {
    assert_eq!(compare(BinOp::NotEqual, &Value::Int(1), &Value::Int(2)), Ok(true));
    assert_eq!(compare(BinOp::LessEqual, &Value::Int(2), &Value::Int(2)), Ok(true));
    assert_eq!(
        compare(BinOp::LessThan, &Value::from("a"), &Value::from("b")),
        Err(EvaluationFault::UndefinedOperator { op: "<", kind: "string" })
    );
    assert!(matches!(
        compare(BinOp::Equal, &Value::Bool(true), &Value::Bool(true)),
        Err(EvaluationFault::UndefinedOperator { kind: "bool", .. })
    ));
    assert!(matches!(
        compare(BinOp::Equal, &Value::from("5"), &Value::Int(5)),
        Err(EvaluationFault::TypeMismatch { lhs: "string", rhs: "int", .. })
    ));
}
