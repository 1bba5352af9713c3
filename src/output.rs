//! Textual and JSON renderings of syntax trees.
//!
//! All output is deterministic: the same tree always prints the same way,
//! which makes dumps suitable for snapshot-style assertions.
//!
//! # Examples
//!
//! ```
//! use ql_lang::parse_expression;
//! use ql_lang::output::{dump, dump_pretty};
//!
//! let node = parse_expression("1 + 2 * 3").unwrap();
//! assert_eq!(dump(&node), "(+ 1 (* 2 3))");
//! assert_eq!(dump_pretty(&node), "(+\n  1\n  (*\n    2\n    3))");
//! ```

use serde_json::{Map, json};

use crate::ast::Node;

/// S-expression printer for [`Node`] trees.
///
/// Leaves print as their source text; every other node prints as a
/// parenthesized head followed by its children in visit order.
pub struct AstPrinter {
    pretty: bool,
}

impl AstPrinter {
    pub fn new(pretty: bool) -> Self {
        AstPrinter { pretty }
    }

    pub fn print(&self, node: &Node) -> String {
        let mut out = String::new();
        self.print_node(node, 0, &mut out);
        out
    }

    fn print_node(&self, node: &Node, indent: usize, out: &mut String) {
        let (head, children): (String, Vec<Child<'_>>) = match node {
            Node::Ident(s) | Node::Number(s) | Node::String(s) => {
                out.push_str(s);
                return;
            }
            Node::Unary { op, operand } => (op.to_string(), vec![Child::Node(operand)]),
            Node::Binary { op, lhs, rhs } => {
                (op.to_string(), vec![Child::Node(lhs), Child::Node(rhs)])
            }
            Node::Call { callee, args } => {
                let mut children = vec![Child::Node(callee)];
                children.extend(args.iter().map(Child::Node));
                ("call".to_string(), children)
            }
            Node::Selector { target, key } => {
                let mut children = Vec::new();
                if let Some(target) = target {
                    children.push(Child::Node(target));
                }
                children.push(Child::Text(key));
                (".".to_string(), children)
            }
            Node::Paren(inner) => ("paren".to_string(), vec![Child::Node(inner)]),
            Node::Index { target, index } => {
                ("index".to_string(), vec![Child::Node(target), Child::Node(index)])
            }
            Node::Array(items) => ("array".to_string(), items.iter().map(Child::Node).collect()),
            Node::Object(pairs) => ("object".to_string(), pairs.iter().map(Child::Node).collect()),
            Node::Pair { key, value } => {
                ("pair".to_string(), vec![Child::Text(key), Child::Node(value)])
            }
            Node::Ternary {
                cond,
                then,
                otherwise,
            } => (
                "?".to_string(),
                vec![Child::Node(cond), Child::Node(then), Child::Node(otherwise)],
            ),
        };

        out.push('(');
        out.push_str(&head);
        for child in children {
            if self.pretty {
                out.push('\n');
                out.push_str(&self.indent(indent + 1));
            } else {
                out.push(' ');
            }
            match child {
                Child::Node(n) => self.print_node(n, indent + 1, out),
                Child::Text(t) => out.push_str(t),
            }
        }
        out.push(')');
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

enum Child<'n> {
    Node(&'n Node),
    Text(&'n str),
}

/// Single-line S-expression dump of a tree.
pub fn dump(node: &Node) -> String {
    AstPrinter::new(false).print(node)
}

/// Indented S-expression dump, one child per line.
pub fn dump_pretty(node: &Node) -> String {
    AstPrinter::new(true).print(node)
}

/// JSON form of a tree: `{"type": <kind>, ...fields}`.
///
/// # Examples
///
/// ```
/// use ql_lang::parse_expression;
/// use ql_lang::output::node_to_json;
///
/// let node = parse_expression("n.op").unwrap();
/// assert_eq!(
///     node_to_json(&node).to_string(),
///     r#"{"key":"op","target":{"name":"n","type":"ident"},"type":"selector"}"#
/// );
/// ```
pub fn node_to_json(node: &Node) -> serde_json::Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), json!(node.kind()));

    match node {
        Node::Ident(name) => {
            obj.insert("name".to_string(), json!(name));
        }
        Node::Number(text) | Node::String(text) => {
            obj.insert("text".to_string(), json!(text));
        }
        Node::Unary { op, operand } => {
            obj.insert("op".to_string(), json!(op.symbol()));
            obj.insert("operand".to_string(), node_to_json(operand));
        }
        Node::Binary { op, lhs, rhs } => {
            obj.insert("op".to_string(), json!(op.symbol()));
            obj.insert("lhs".to_string(), node_to_json(lhs));
            obj.insert("rhs".to_string(), node_to_json(rhs));
        }
        Node::Call { callee, args } => {
            obj.insert("callee".to_string(), node_to_json(callee));
            obj.insert("args".to_string(), nodes_to_json(args));
        }
        Node::Selector { target, key } => {
            let target = target.as_deref().map_or(serde_json::Value::Null, node_to_json);
            obj.insert("target".to_string(), target);
            obj.insert("key".to_string(), json!(key));
        }
        Node::Paren(inner) => {
            obj.insert("inner".to_string(), node_to_json(inner));
        }
        Node::Index { target, index } => {
            obj.insert("target".to_string(), node_to_json(target));
            obj.insert("index".to_string(), node_to_json(index));
        }
        Node::Array(items) => {
            obj.insert("items".to_string(), nodes_to_json(items));
        }
        Node::Object(pairs) => {
            obj.insert("pairs".to_string(), nodes_to_json(pairs));
        }
        Node::Pair { key, value } => {
            obj.insert("key".to_string(), json!(key));
            obj.insert("value".to_string(), node_to_json(value));
        }
        Node::Ternary {
            cond,
            then,
            otherwise,
        } => {
            obj.insert("cond".to_string(), node_to_json(cond));
            obj.insert("then".to_string(), node_to_json(then));
            obj.insert("else".to_string(), node_to_json(otherwise));
        }
    }
    serde_json::Value::Object(obj)
}

fn nodes_to_json(nodes: &[Node]) -> serde_json::Value {
    serde_json::Value::Array(nodes.iter().map(node_to_json).collect())
}

/// Serializes JSON output for the CLI, indented when `pretty` is set.
pub fn render_json(value: &serde_json::Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
