use std::fmt;

/// The kind of a lexical token.
///
/// Operator and punctuation kinds each map to exactly one fixed spelling,
/// available through [`TokenKind::symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input. Always the last token of a tokenized sequence.
    Eof,

    /// Run of spaces. Produced by [`crate::Lexer::next_token`], never kept by
    /// [`crate::tokenize`].
    Whitespace,

    /// Letter followed by letters or digits
    ///
    /// # Examples
    /// ```text
    /// n
    /// lhs
    /// Entity2
    /// ```
    Ident,

    /// Digit run with an optional fractional part
    ///
    /// # Examples
    /// ```text
    /// 40
    /// 3.14
    /// ```
    Number,

    /// Single-quoted string, quotes and escapes included verbatim
    ///
    /// # Examples
    /// ```text
    /// '+'
    /// 'it\'s'
    /// ```
    String,

    // Punctuation
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Question,

    // Comparison
    EqEq,
    NotEq,
    GtEq,
    LtEq,
    Gt,
    Lt,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Logical
    Bang,
    AndAnd,
    OrOr,
}

impl TokenKind {
    /// Fixed spelling of an operator or punctuation kind.
    pub fn symbol(&self) -> Option<&'static str> {
        use TokenKind::*;
        let s = match self {
            Dot => ".",
            Comma => ",",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Colon => ":",
            Question => "?",
            EqEq => "==",
            NotEq => "!=",
            GtEq => ">=",
            LtEq => "<=",
            Gt => ">",
            Lt => "<",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Bang => "!",
            AndAnd => "&&",
            OrOr => "||",
            Eof | Whitespace | Ident | Number | String => return None,
        };
        Some(s)
    }

    /// Short lowercase name, used by the token listing of the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "eof",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Ident => "ident",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            _ => "op",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// A lexical token with its exact source text and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Matched substring. Empty for [`TokenKind::Eof`].
    pub text: String,
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}..{}", self.kind.name(), self.text, self.start, self.end)
    }
}
