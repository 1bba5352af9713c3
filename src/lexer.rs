use thiserror::Error;

use crate::ast::{Token, TokenKind};

/// Errors raised while tokenizing an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Nothing to tokenize
    #[error("empty input")]
    EmptyInput,

    /// No token rule matches at `offset`
    #[error("unexpected character '{ch}' at {offset}")]
    UnexpectedChar { ch: char, offset: usize },
}

/// Byte-oriented tokenizer for where-clause expressions.
///
/// Rules are tried in a fixed order at each position: operators, spaces,
/// identifiers, numbers, then single-quoted strings.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    fn current_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.input[start..self.position], start, self.position)
    }

    fn read_operator(&mut self) -> Option<Token> {
        let start = self.position;
        let first = self.current_byte()?;
        let second = self.peek_byte(1);

        let double = match (first, second) {
            (b'=', Some(b'=')) => Some(TokenKind::EqEq),
            (b'!', Some(b'=')) => Some(TokenKind::NotEq),
            (b'>', Some(b'=')) => Some(TokenKind::GtEq),
            (b'<', Some(b'=')) => Some(TokenKind::LtEq),
            (b'&', Some(b'&')) => Some(TokenKind::AndAnd),
            (b'|', Some(b'|')) => Some(TokenKind::OrOr),
            _ => None,
        };
        if let Some(kind) = double {
            self.advance();
            self.advance();
            return Some(self.token_from(kind, start));
        }

        let single = match first {
            b'.' => TokenKind::Dot,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b':' => TokenKind::Colon,
            b'?' => TokenKind::Question,
            b'>' => TokenKind::Gt,
            b'<' => TokenKind::Lt,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'!' => TokenKind::Bang,
            _ => return None,
        };
        self.advance();
        Some(self.token_from(single, start))
    }

    fn read_whitespace(&mut self) -> Option<Token> {
        let start = self.position;
        while self.current_byte() == Some(b' ') {
            self.advance();
        }
        (self.position != start).then(|| self.token_from(TokenKind::Whitespace, start))
    }

    fn read_identifier(&mut self) -> Option<Token> {
        let start = self.position;
        if !self.current_byte()?.is_ascii_alphabetic() {
            return None;
        }
        self.advance();
        while self.current_byte().is_some_and(|b| b.is_ascii_alphanumeric()) {
            self.advance();
        }
        Some(self.token_from(TokenKind::Ident, start))
    }

    fn read_number(&mut self) -> Option<Token> {
        let start = self.position;
        if !self.current_byte()?.is_ascii_digit() {
            return None;
        }
        while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        if self.current_byte() == Some(b'.') {
            self.advance();
            while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
            }
        }
        Some(self.token_from(TokenKind::Number, start))
    }

    /// An unterminated string runs to the end of input instead of failing.
    fn read_string(&mut self) -> Option<Token> {
        let start = self.position;
        if self.current_byte()? != b'\'' {
            return None;
        }
        self.advance(); // opening quote

        while let Some(b) = self.current_byte() {
            match b {
                b'\\' => {
                    self.advance();
                    self.advance();
                }
                b'\'' => {
                    self.advance();
                    break;
                }
                _ => self.advance(),
            }
        }
        Some(self.token_from(TokenKind::String, start))
    }

    /// Returns the next token, including whitespace tokens.
    ///
    /// Once the input is exhausted every call returns an end-of-file token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.position >= self.input.len() {
            return Ok(Token::new(TokenKind::Eof, "", self.position, self.position));
        }

        if let Some(tok) = self.read_operator() {
            return Ok(tok);
        }
        if let Some(tok) = self.read_whitespace() {
            return Ok(tok);
        }
        if let Some(tok) = self.read_identifier() {
            return Ok(tok);
        }
        if let Some(tok) = self.read_number() {
            return Ok(tok);
        }
        if let Some(tok) = self.read_string() {
            return Ok(tok);
        }

        let ch = self.input[self.position..].chars().next().unwrap_or('\0');
        Err(LexError::UnexpectedChar {
            ch,
            offset: self.position,
        })
    }

    /// Tokenizes the whole input, dropping whitespace.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        if self.input.is_empty() {
            return Err(LexError::EmptyInput);
        }

        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Whitespace => continue,
                TokenKind::Eof => {
                    tokens.push(tok);
                    break;
                }
                _ => tokens.push(tok),
            }
        }
        Ok(tokens)
    }
}

/// Converts an expression string into tokens terminated by a single
/// end-of-file token.
///
/// # Examples
///
/// ```
/// use ql_lang::{tokenize, TokenKind};
///
/// let tokens = tokenize("n.num > 40").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::Ident, TokenKind::Dot, TokenKind::Ident, TokenKind::Gt, TokenKind::Number, TokenKind::Eof]
/// );
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).tokenize()
}

#[test]
fn test_next_token_reports_whitespace() {
    let mut lexer = Lexer::new("a  b");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
    let ws = lexer.next_token().unwrap();
    assert_eq!(ws.kind, TokenKind::Whitespace);
    assert_eq!((ws.start, ws.end), (1, 3));
    assert_eq!(lexer.next_token().unwrap().text, "b");
    assert!(lexer.next_token().unwrap().is_eof());
    assert!(lexer.next_token().unwrap().is_eof());
}

#[test]
fn test_lone_ampersand_is_rejected() {
    assert_eq!(
        tokenize("a & b"),
        Err(LexError::UnexpectedChar { ch: '&', offset: 2 })
    );
}
