use thiserror::Error;

use crate::{
    ast::{BinOp, Node, Token, TokenKind, UnaryOp},
    lexer::{LexError, tokenize},
};

/// Errors raised while building a syntax tree from tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No tokens at all
    #[error("empty input")]
    EmptyInput,

    /// Names the first token that could not be consumed: the one just past
    /// the furthest position any alternative reached. Running out of input
    /// names the end-of-file token, whose text is empty.
    #[error("unexpected {} at {offset}", describe(.text))]
    Unexpected { text: String, offset: usize },
}

fn describe(text: &str) -> String {
    if text.is_empty() {
        "end of input".to_string()
    } else {
        format!("\"{}\"", text)
    }
}

/// Either half of turning expression text into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("fail to tokenize: {0}")]
    Lex(#[from] LexError),

    #[error("fail to parse: {0}")]
    Parse(#[from] ParseError),
}

/// Backtracking recursive-descent parser over a token slice.
///
/// Every production either succeeds or restores the position it started
/// from, so alternatives can be tried freely. The furthest position any
/// attempt reached is kept for error reporting.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    furthest: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Parser {
            tokens,
            pos: 0,
            furthest: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.furthest = self.furthest.max(self.pos);
        Some(tok)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.peek_kind() == Some(kind) {
            self.bump()
        } else {
            None
        }
    }

    fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Matches a logical operator given either as a symbol or as a keyword.
    fn eat_logical(&mut self, symbol: TokenKind, keyword: &str) -> bool {
        match self.peek() {
            Some(tok) if tok.kind == symbol => {}
            Some(tok) if tok.kind == TokenKind::Ident && tok.text == keyword => {}
            _ => return false,
        }
        self.bump();
        true
    }

    /// Parses one left-associative binary level: `next (op next)*`.
    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> Option<Node>,
        op: fn(&mut Self) -> Option<BinOp>,
    ) -> Option<Node> {
        let start = self.pos;
        let Some(mut lhs) = next(self) else {
            self.reset(start);
            return None;
        };

        loop {
            let tmp = self.pos;
            if let Some(op) = op(self) {
                if let Some(rhs) = next(self) {
                    lhs = Node::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                    continue;
                }
            }
            self.reset(tmp);
            break;
        }
        Some(lhs)
    }

    fn or_op(&mut self) -> Option<BinOp> {
        self.eat_logical(TokenKind::OrOr, "or").then_some(BinOp::Or)
    }

    fn and_op(&mut self) -> Option<BinOp> {
        self.eat_logical(TokenKind::AndAnd, "and").then_some(BinOp::And)
    }

    fn comparison_op(&mut self) -> Option<BinOp> {
        let op = BinOp::comparison(self.peek_kind()?)?;
        self.bump();
        Some(op)
    }

    fn additive_op(&mut self) -> Option<BinOp> {
        let op = BinOp::additive(self.peek_kind()?)?;
        self.bump();
        Some(op)
    }

    fn multiplicative_op(&mut self) -> Option<BinOp> {
        let op = BinOp::multiplicative(self.peek_kind()?)?;
        self.bump();
        Some(op)
    }

    /// Entry production.
    pub fn parse_expression(&mut self) -> Option<Node> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Option<Node> {
        let cond = self.parse_or()?;

        let tmp = self.pos;
        if self.eat(TokenKind::Question).is_some() {
            if let Some(then) = self.parse_or() {
                if self.eat(TokenKind::Colon).is_some() {
                    if let Some(otherwise) = self.parse_or() {
                        return Some(Node::Ternary {
                            cond: Box::new(cond),
                            then: Box::new(then),
                            otherwise: Box::new(otherwise),
                        });
                    }
                }
            }
        }
        self.reset(tmp);
        Some(cond)
    }

    fn parse_or(&mut self) -> Option<Node> {
        self.binary_level(Self::parse_and, Self::or_op)
    }

    fn parse_and(&mut self) -> Option<Node> {
        self.binary_level(Self::parse_comparison, Self::and_op)
    }

    fn parse_comparison(&mut self) -> Option<Node> {
        self.binary_level(Self::parse_sum, Self::comparison_op)
    }

    fn parse_sum(&mut self) -> Option<Node> {
        self.binary_level(Self::parse_term, Self::additive_op)
    }

    fn parse_term(&mut self) -> Option<Node> {
        self.binary_level(Self::parse_unary, Self::multiplicative_op)
    }

    fn parse_unary(&mut self) -> Option<Node> {
        let start = self.pos;
        let op = match self.peek_kind() {
            Some(TokenKind::Minus) => Some(UnaryOp::Negate),
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            self.bump();
            if let Some(operand) = self.parse_primary() {
                return Some(Node::Unary {
                    op,
                    operand: Box::new(operand),
                });
            }
            self.reset(start);
        }
        self.parse_primary()
    }

    /// Atom or leading `.key`, followed by call, index and selector postfixes.
    fn parse_primary(&mut self) -> Option<Node> {
        let mut lhs = match self.parse_atom() {
            Some(atom) => atom,
            None => self.parse_bare_selector()?,
        };

        loop {
            let tmp = self.pos;

            if self.eat(TokenKind::LParen).is_some() {
                let args = self.parse_expression_list();
                if self.eat(TokenKind::RParen).is_some() {
                    lhs = Node::Call {
                        callee: Box::new(lhs),
                        args,
                    };
                    continue;
                }
            }
            self.reset(tmp);

            if self.eat(TokenKind::LBracket).is_some() {
                if let Some(index) = self.parse_expression() {
                    if self.eat(TokenKind::RBracket).is_some() {
                        lhs = Node::Index {
                            target: Box::new(lhs),
                            index: Box::new(index),
                        };
                        continue;
                    }
                }
            }
            self.reset(tmp);

            if self.eat(TokenKind::Dot).is_some() {
                if let Some(key) = self.eat(TokenKind::Ident) {
                    lhs = Node::Selector {
                        target: Some(Box::new(lhs)),
                        key: key.text.clone(),
                    };
                    continue;
                }
            }
            self.reset(tmp);
            break;
        }
        Some(lhs)
    }

    fn parse_bare_selector(&mut self) -> Option<Node> {
        let start = self.pos;
        if self.eat(TokenKind::Dot).is_some() {
            if let Some(key) = self.eat(TokenKind::Ident) {
                return Some(Node::Selector {
                    target: None,
                    key: key.text.clone(),
                });
            }
        }
        self.reset(start);
        None
    }

    fn parse_atom(&mut self) -> Option<Node> {
        let start = self.pos;
        let node = match self.peek_kind()? {
            TokenKind::Ident => Some(Node::Ident(self.bump()?.text.clone())),
            TokenKind::Number => Some(Node::Number(self.bump()?.text.clone())),
            TokenKind::String => Some(Node::String(self.bump()?.text.clone())),
            TokenKind::LParen => {
                self.bump();
                self.parse_expression().and_then(|inner| {
                    self.eat(TokenKind::RParen)
                        .map(|_| Node::Paren(Box::new(inner)))
                })
            }
            TokenKind::LBracket => {
                self.bump();
                let items = self.parse_expression_list();
                self.eat(TokenKind::RBracket).map(|_| Node::Array(items))
            }
            TokenKind::LBrace => {
                self.bump();
                let pairs = self.parse_pair_list();
                self.eat(TokenKind::RBrace).map(|_| Node::Object(pairs))
            }
            _ => None,
        };

        if node.is_none() {
            self.reset(start);
        }
        node
    }

    /// Zero or more comma-separated expressions.
    fn parse_expression_list(&mut self) -> Vec<Node> {
        let mut items = Vec::new();
        let Some(first) = self.parse_expression() else {
            return items;
        };
        items.push(first);

        loop {
            let tmp = self.pos;
            if self.eat(TokenKind::Comma).is_some() {
                if let Some(item) = self.parse_expression() {
                    items.push(item);
                    continue;
                }
            }
            self.reset(tmp);
            break;
        }
        items
    }

    /// Zero or more comma-separated `key: expr` pairs.
    fn parse_pair_list(&mut self) -> Vec<Node> {
        let mut pairs = Vec::new();
        let Some(first) = self.parse_pair() else {
            return pairs;
        };
        pairs.push(first);

        loop {
            let tmp = self.pos;
            if self.eat(TokenKind::Comma).is_some() {
                if let Some(pair) = self.parse_pair() {
                    pairs.push(pair);
                    continue;
                }
            }
            self.reset(tmp);
            break;
        }
        pairs
    }

    fn parse_pair(&mut self) -> Option<Node> {
        let start = self.pos;
        if let Some(key) = self.eat(TokenKind::Ident) {
            if self.eat(TokenKind::Colon).is_some() {
                if let Some(value) = self.parse_expression() {
                    return Some(Node::Pair {
                        key: key.text.clone(),
                        value: Box::new(value),
                    });
                }
            }
        }
        self.reset(start);
        None
    }

    /// Parses the whole token slice as one expression followed by end-of-file.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        match self.parse_expression() {
            Some(node) if self.peek_kind() == Some(TokenKind::Eof) => Ok(node),
            _ => Err(self.error()),
        }
    }

    fn error(&self) -> ParseError {
        let idx = self.furthest.min(self.tokens.len() - 1);
        let tok = &self.tokens[idx];
        ParseError::Unexpected {
            text: tok.text.clone(),
            offset: tok.start,
        }
    }
}

/// Parses a token sequence produced by [`tokenize`](crate::tokenize).
///
/// # Examples
///
/// ```
/// use ql_lang::{parse, tokenize, BinOp, Node};
///
/// let tokens = tokenize("1 + 2 * 3").unwrap();
/// match parse(&tokens).unwrap() {
///     Node::Binary { op: BinOp::Add, rhs, .. } => {
///         assert!(matches!(*rhs, Node::Binary { op: BinOp::Multiply, .. }));
///     }
///     other => panic!("unexpected tree {:?}", other),
/// }
/// ```
pub fn parse(tokens: &[Token]) -> Result<Node, ParseError> {
    Parser::new(tokens).parse()
}

/// Tokenizes and parses an expression string.
pub fn parse_expression(text: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(text)?;
    Ok(parse(&tokens)?)
}
