use crate::ast::{BinOp, UnaryOp};

/// Abstract Syntax Tree node produced by the parser.
///
/// Literal nodes keep the source text of their token; the evaluator decides
/// how to interpret it. Children are owned, so a `Node` is always a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Identifier
    ///
    /// # Example
    /// ```text
    /// n
    /// ```
    Ident(String),

    /// Number literal, verbatim
    ///
    /// # Example
    /// ```text
    /// 40
    /// ```
    Number(String),

    /// String literal, verbatim including quotes and escapes
    ///
    /// # Example
    /// ```text
    /// 'binary'
    /// ```
    String(String),

    /// Prefix operation
    Unary { op: UnaryOp, operand: Box<Node> },

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },

    /// Call
    ///
    /// # Example
    /// ```text
    /// n.child(0, 'x')
    /// ```
    Call { callee: Box<Node>, args: Vec<Node> },

    /// Field selector. `target` is `None` for a leading `.key`.
    ///
    /// # Examples
    /// ```text
    /// n.op
    /// .op
    /// ```
    Selector {
        target: Option<Box<Node>>,
        key: String,
    },

    /// Parenthesized expression
    Paren(Box<Node>),

    /// Index access
    ///
    /// # Example
    /// ```text
    /// n.args[0]
    /// ```
    Index { target: Box<Node>, index: Box<Node> },

    /// Array literal
    Array(Vec<Node>),

    /// Object literal. Every item is a [`Node::Pair`].
    Object(Vec<Node>),

    /// `key: value` inside an object literal
    Pair { key: String, value: Box<Node> },

    /// `cond ? then : otherwise`
    Ternary {
        cond: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
}

impl Node {
    /// Short lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Ident(_) => "ident",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Unary { .. } => "unary",
            Node::Binary { .. } => "binary",
            Node::Call { .. } => "call",
            Node::Selector { .. } => "selector",
            Node::Paren(_) => "paren",
            Node::Index { .. } => "index",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Pair { .. } => "pair",
            Node::Ternary { .. } => "ternary",
        }
    }

    /// Applies `f` to this node and every descendant, pre-order.
    ///
    /// Children are visited in source order: the first operand, then the
    /// second, then any list of arguments or items.
    ///
    /// # Examples
    ///
    /// ```
    /// use ql_lang::{parse_expression, Node};
    ///
    /// let node = parse_expression("a.op == '+'").unwrap();
    /// let mut kinds = Vec::new();
    /// node.visit(&mut |n: &Node| kinds.push(n.kind()));
    /// assert_eq!(kinds, ["binary", "selector", "ident", "string"]);
    /// ```
    pub fn visit<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Node),
    {
        f(self);
        match self {
            Node::Ident(_) | Node::Number(_) | Node::String(_) => {}
            Node::Unary { operand, .. } => operand.visit(f),
            Node::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            Node::Call { callee, args } => {
                callee.visit(f);
                for arg in args {
                    arg.visit(f);
                }
            }
            Node::Selector { target, .. } => {
                if let Some(target) = target {
                    target.visit(f);
                }
            }
            Node::Paren(inner) => inner.visit(f),
            Node::Index { target, index } => {
                target.visit(f);
                index.visit(f);
            }
            Node::Array(items) | Node::Object(items) => {
                for item in items {
                    item.visit(f);
                }
            }
            Node::Pair { value, .. } => value.visit(f),
            Node::Ternary {
                cond,
                then,
                otherwise,
            } => {
                cond.visit(f);
                then.visit(f);
                otherwise.visit(f);
            }
        }
    }

    /// Collects references to every node in pre-order.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        self.visit(&mut |n| nodes.push(n));
        nodes
    }
}
