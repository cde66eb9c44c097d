//! Structural typing: turns a token stream into [`KormType`] nodes.
//!
//! Recursive descent over a single forward cursor. Every production is
//! decided by the current token, so there is no backtracking.

use crate::token::{Data, Token, TokenKind};
use crate::value::{Element, KormType};
use crate::{Error, Result};
use log::trace;
use std::vec::IntoIter;

/// Types a token stream into the top-level nodes of a document.
///
/// # Errors
///
/// Returns [`Error::Syntax`] when the tokens do not form a document, and
/// [`Error::TypeMismatch`] for scalar tokens whose text does not coerce
/// (such as a char literal with two characters).
pub fn type_tokens(tokens: Vec<Token>) -> Result<Vec<KormType>> {
    Typer::new(tokens).run()
}

pub struct Typer {
    tokens: IntoIter<Token>,
    line: usize,
    column: usize,
}

impl Typer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Typer {
            tokens: tokens.into_iter(),
            line: 1,
            column: 1,
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.line = token.line;
        self.column = token.column;
        Some(token)
    }

    pub fn run(mut self) -> Result<Vec<KormType>> {
        let mut nodes = Vec::new();

        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::Comma => {}
                TokenKind::Symbol | TokenKind::Complex => nodes.push(self.parse_assign(token)?),
                TokenKind::BraceL => nodes.push(self.parse_hash(Data::none())?),
                TokenKind::BrackL => nodes.push(self.parse_list(Data::none())?),
                kind if kind.is_scalar() => nodes.push(KormType::Base {
                    key: Data::none(),
                    data: token.data.effective()?,
                }),
                _ => return Err(out_of_place(&token)),
            }
        }

        trace!("typed {} top-level nodes", nodes.len());
        Ok(nodes)
    }

    fn parse_assign(&mut self, symbol: Token) -> Result<KormType> {
        match self.next() {
            Some(assign) if assign.kind == TokenKind::Assign => {}
            _ => {
                return Err(Error::syntax(
                    symbol.line,
                    symbol.column,
                    "symbol without assignment",
                    &symbol.data.raw,
                ))
            }
        }

        let value = self.next().ok_or_else(|| {
            Error::syntax(
                symbol.line,
                symbol.column,
                "assignment without value",
                &symbol.data.raw,
            )
        })?;

        let key = symbol.data;
        match value.kind {
            TokenKind::BraceL => self.parse_hash(key),
            TokenKind::BrackL => self.parse_list(key),
            kind if kind.is_scalar() => Ok(KormType::Base {
                key,
                data: value.data.effective()?,
            }),
            _ => Err(out_of_place(&value)),
        }
    }

    fn parse_hash(&mut self, key: Data) -> Result<KormType> {
        let mut data = Vec::new();

        loop {
            let token = self.next().ok_or_else(|| self.unclosed("hash"))?;
            match token.kind {
                TokenKind::BraceR => break,
                TokenKind::Comma => {}
                TokenKind::Symbol | TokenKind::Complex => data.push(self.parse_assign(token)?),
                _ => return Err(out_of_place(&token)),
            }
        }

        Ok(KormType::Hash { key, data })
    }

    fn parse_list(&mut self, key: Data) -> Result<KormType> {
        let mut data = Vec::new();

        loop {
            let token = self.next().ok_or_else(|| self.unclosed("list"))?;
            match token.kind {
                TokenKind::BrackR => break,
                TokenKind::Comma => {}
                TokenKind::BraceL => data.push(Element::Korm(self.parse_hash(Data::none())?)),
                TokenKind::BrackL => data.push(Element::Korm(self.parse_list(Data::none())?)),
                kind if kind.is_scalar() => data.push(Element::Scalar(token.data.effective()?)),
                _ => return Err(out_of_place(&token)),
            }
        }

        Ok(KormType::List { key, data })
    }

    fn unclosed(&self, what: &str) -> Error {
        Error::syntax(self.line, self.column, &format!("unclosed {}", what), "")
    }
}

fn out_of_place(token: &Token) -> Error {
    Error::syntax(
        token.line,
        token.column,
        "out of place token",
        &token.data.raw,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::value::Scalar;

    fn type_text(text: &str) -> Result<Vec<KormType>> {
        type_tokens(tokenize(text)?)
    }

    #[test]
    fn test_top_level_scalar() {
        let nodes = type_text("1234567").unwrap();
        assert_eq!(
            nodes,
            vec![KormType::Base {
                key: Data::none(),
                data: Scalar::Int(1234567)
            }]
        );
    }

    #[test]
    fn test_keyed_entries() {
        let nodes = type_text("name: \"Sxtanna\" date: MONDAY").unwrap();
        assert_eq!(nodes[0], KormType::base("name", Scalar::Text("Sxtanna".to_string())));
        assert_eq!(nodes[1], KormType::base("date", Scalar::Symbol("MONDAY".to_string())));
    }

    #[test]
    fn test_list_elements_are_bare() {
        let nodes = type_text("[1, MONDAY, { a: 1 }, [2]]").unwrap();
        let list = nodes[0].as_list().unwrap();
        assert_eq!(list[0], Element::Scalar(Scalar::Int(1)));
        assert_eq!(list[1], Element::Scalar(Scalar::Symbol("MONDAY".to_string())));
        assert!(list[2].as_hash().is_some());
        assert!(list[3].as_list().is_some());
    }

    #[test]
    fn test_integer_key_keeps_lexed_kind() {
        let nodes = type_text("{ 1: \"1\" }").unwrap();
        let entry = &nodes[0].as_hash().unwrap()[0];
        assert_eq!(entry.key().kind, TokenKind::Int);
        assert_eq!(entry.key().effective().unwrap(), Scalar::Int(1));
    }

    #[test]
    fn test_complex_key() {
        let nodes = type_text("`{ x: 1 y: 2 }`: 21").unwrap();
        assert_eq!(nodes[0].key().kind, TokenKind::Complex);
        assert_eq!(nodes[0].key().raw, "{ x: 1 y: 2 }");
        assert_eq!(nodes[0].as_scalar(), Some(&Scalar::Int(21)));
    }

    #[test]
    fn test_complex_list_element() {
        let nodes = type_text("[`{ x: 1 }`]").unwrap();
        let list = nodes[0].as_list().unwrap();
        assert_eq!(
            list[0],
            Element::Scalar(Scalar::Complex("{ x: 1 }".to_string()))
        );
    }

    #[test]
    fn test_symbol_without_assignment() {
        let err = type_text("name \"x\"").unwrap_err();
        assert!(err.to_string().contains("symbol without assignment"));
    }

    #[test]
    fn test_out_of_place_token() {
        let err = type_text("{ 1 }").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 1, col: 3, .. }));
        assert!(type_text("]").is_err());
        assert!(type_text("a: }").is_err());
    }

    #[test]
    fn test_unclosed() {
        assert!(type_text("{ a: 1").is_err());
        assert!(type_text("[1, 2").is_err());
    }

    #[test]
    fn test_top_level_commas_skipped() {
        let nodes = type_text("a: 1,\nb: 2,").unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_bad_char_literal() {
        assert!(matches!(
            type_text("c: 'ab'"),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
