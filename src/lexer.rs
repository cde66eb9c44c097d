//! Lexing of Korm text into [`Token`]s.
//!
//! The lexer makes a single forward pass with one character of lookahead.
//! Comments are dropped here and never reach the typer.
//!
//! ```rust
//! use korm::lexer::tokenize;
//! use korm::TokenKind;
//!
//! let tokens = tokenize("1: 'A'").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(kinds, [TokenKind::Symbol, TokenKind::Assign, TokenKind::Char]);
//! ```

use crate::token::{Token, TokenKind};
use crate::{Error, Result};
use log::trace;

/// Tokenizes a whole document.
///
/// # Errors
///
/// Returns [`Error::Lex`] for an unterminated literal or block comment, or a
/// `/` that does not open a comment.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

/// Character cursor that records tokens as it goes.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn has_next(&self) -> bool {
        self.position < self.chars.len()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek(0)?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn push(&mut self, line: usize, column: usize, raw: impl Into<String>, kind: TokenKind) {
        self.tokens.push(Token::new(line, column, raw, kind));
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        while let Some(ch) = self.peek(0) {
            let (line, column) = (self.line, self.column);
            match ch {
                c if c.is_whitespace() => {
                    self.advance();
                }
                ',' => self.single(TokenKind::Comma, ch),
                '{' => self.single(TokenKind::BraceL, ch),
                '}' => self.single(TokenKind::BraceR, ch),
                '[' => self.single(TokenKind::BrackL, ch),
                ']' => self.single(TokenKind::BrackR, ch),
                ':' => {
                    if let Some(last) = self.tokens.last_mut() {
                        if last.kind.is_retrospective() {
                            last.kind = TokenKind::Symbol;
                        }
                    }
                    self.single(TokenKind::Assign, ch);
                }
                '\'' => self.read_literal(ch, TokenKind::Char)?,
                '`' => self.read_literal(ch, TokenKind::Complex)?,
                '"' => self.read_literal(ch, TokenKind::Text)?,
                '/' => self.skip_comment()?,
                _ => self.read_word(line, column),
            }
        }

        trace!("lexed {} tokens over {} lines", self.tokens.len(), self.line);
        Ok(self.tokens)
    }

    fn single(&mut self, kind: TokenKind, ch: char) {
        let (line, column) = (self.line, self.column);
        self.advance();
        self.push(line, column, ch, kind);
    }

    fn read_literal(&mut self, delimiter: char, kind: TokenKind) -> Result<()> {
        let (line, column) = (self.line, self.column);
        self.advance();

        let mut text = String::new();
        loop {
            match self.peek(0) {
                None => {
                    let what = match kind {
                        TokenKind::Char => "unterminated char literal",
                        TokenKind::Complex => "unterminated complex literal",
                        _ => "unterminated text literal",
                    };
                    return Err(Error::lex(line, column, what));
                }
                Some('\\') => match self.peek(1) {
                    Some(next) if next == delimiter || next == '\\' => {
                        text.push(next);
                        self.advance();
                        self.advance();
                    }
                    _ => {
                        text.push('\\');
                        self.advance();
                    }
                },
                Some(c) if c == delimiter => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }

        self.push(line, column, text, kind);
        Ok(())
    }

    fn skip_comment(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column);
        match self.peek(1) {
            Some('/') => {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
                Ok(())
            }
            Some('*') => {
                self.advance();
                self.advance();
                while self.has_next() {
                    if self.peek(0) == Some('*') && self.peek(1) == Some('/') {
                        self.advance();
                        self.advance();
                        return Ok(());
                    }
                    self.advance();
                }
                Err(Error::lex(line, column, "unterminated block comment"))
            }
            _ => Err(Error::lex(line, column, "`/` does not open a comment")),
        }
    }

    fn read_word(&mut self, line: usize, column: usize) {
        let mut text = String::new();
        let mut kind = TokenKind::Symbol;

        if let Some(first) = self.peek(0).filter(|c| c.is_ascii_digit() || *c == '-') {
            kind = TokenKind::Int;
            text.push(first);
            self.advance();

            while let Some(c) = self.peek(0) {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else if c == '.' && kind == TokenKind::Int {
                    kind = TokenKind::Dec;
                    text.push(c);
                    self.advance();
                } else if ends_number(c) {
                    break;
                } else {
                    kind = TokenKind::Symbol;
                    break;
                }
            }

            if text == "-" {
                kind = TokenKind::Symbol;
            }
        } else if let Some(first) = self.advance() {
            text.push(first);
        }

        if kind == TokenKind::Symbol {
            while let Some(c) = self.peek(0).filter(|c| is_symbol_char(*c)) {
                text.push(c);
                self.advance();
            }
        }

        if text == "true" || text == "false" {
            kind = TokenKind::Bool;
        }

        self.push(line, column, text, kind);
    }
}

fn ends_number(c: char) -> bool {
    c.is_whitespace() || matches!(c, ']' | '}' | '[' | '{' | ',' | ':' | '/' | '"' | '\'' | '`')
}

/// Characters that may appear in a bare symbol.
pub(crate) fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}
