//! Tokens produced by the [lexer](crate::lexer) and the [`Data`] wrapper that
//! carries a raw token value into the value tree.

use crate::value::Scalar;
use crate::{Error, Result};
use num_bigint::BigInt;
use std::fmt;

/// The classification of a token.
///
/// Structural kinds (`Comma`, braces, brackets, `Assign`) carry no value. Every
/// other kind owns a coercion rule, see [`TokenKind::coerce`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Int,
    Dec,
    Bool,
    Char,
    Text,
    Comma,
    BraceL,
    BraceR,
    BrackL,
    BrackR,
    Assign,
    Symbol,
    Complex,
}

impl TokenKind {
    /// Kinds that turn into a [`TokenKind::Symbol`] when directly followed by
    /// an assignment.
    #[must_use]
    pub const fn is_retrospective(self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Dec | TokenKind::Bool | TokenKind::Char | TokenKind::Text
        )
    }

    /// Kinds that may stand as a value on their own.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Dec
                | TokenKind::Bool
                | TokenKind::Char
                | TokenKind::Text
                | TokenKind::Symbol
                | TokenKind::Complex
        )
    }

    /// Applies this kind's coercion rule to a raw token value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::{Scalar, TokenKind};
    ///
    /// assert_eq!(TokenKind::Int.coerce("42").unwrap(), Scalar::Int(42));
    /// assert_eq!(TokenKind::Bool.coerce("true").unwrap(), Scalar::Bool(true));
    /// assert!(TokenKind::Char.coerce("ab").is_err());
    /// ```
    pub fn coerce(self, raw: &str) -> Result<Scalar> {
        match self {
            TokenKind::Int => match raw.parse::<i64>() {
                Ok(i) => Ok(Scalar::Int(i)),
                Err(_) => raw
                    .parse::<BigInt>()
                    .map(Scalar::BigInt)
                    .map_err(|_| Error::type_mismatch("integer", raw)),
            },
            TokenKind::Dec => raw
                .parse::<f64>()
                .map(Scalar::Dec)
                .map_err(|_| Error::type_mismatch("decimal", raw)),
            TokenKind::Bool => raw
                .parse::<bool>()
                .map(Scalar::Bool)
                .map_err(|_| Error::type_mismatch("boolean", raw)),
            TokenKind::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Scalar::Char(c)),
                    _ => Err(Error::type_mismatch("single character", raw)),
                }
            }
            TokenKind::Text => Ok(Scalar::Text(raw.to_string())),
            TokenKind::Complex => Ok(Scalar::Complex(raw.to_string())),
            TokenKind::Symbol if raw == "null" => Ok(Scalar::Null),
            _ => Ok(Scalar::Symbol(raw.to_string())),
        }
    }
}

/// A raw token value paired with the kind it was lexed as.
///
/// Keys in the value tree are `Data`. The effective value is recomputed from
/// `raw` on every call to [`Data::effective`], so a key written `1:` still reads
/// back as the integer 1 even though its token was reclassified as a symbol.
///
/// `comments` are leading comment lines attached when writing; the lexer
/// discards comments, so parsed data never carries any.
#[derive(Clone, Debug, PartialEq)]
pub struct Data {
    pub raw: String,
    pub kind: TokenKind,
    pub comments: Vec<String>,
}

impl Data {
    pub fn new(raw: impl Into<String>, kind: TokenKind) -> Self {
        Data {
            raw: raw.into(),
            kind,
            comments: Vec::new(),
        }
    }

    /// The empty key of unnamed nodes. The lexer never produces an empty
    /// symbol, so this cannot collide with a written `""` key.
    #[must_use]
    pub fn none() -> Self {
        Data::new("", TokenKind::Symbol)
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.raw.is_empty() && self.kind == TokenKind::Symbol
    }

    /// Coerces the raw value according to its kind.
    pub fn effective(&self) -> Result<Scalar> {
        self.kind.coerce(&self.raw)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A positioned lexical unit.
///
/// `kind` starts equal to `data.kind` and differs only after the retrospect
/// rule reclassified the token as a key.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub line: usize,
    pub column: usize,
    pub data: Data,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(line: usize, column: usize, raw: impl Into<String>, kind: TokenKind) -> Self {
        Token {
            line,
            column,
            data: Data::new(raw, kind),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_overflow_becomes_bigint() {
        let value = TokenKind::Int.coerce("18446744073709551615").unwrap();
        assert_eq!(value, Scalar::BigInt(BigInt::from(u64::MAX)));
    }

    #[test]
    fn test_symbol_null_is_explicit_null() {
        assert_eq!(TokenKind::Symbol.coerce("null").unwrap(), Scalar::Null);
        assert_eq!(
            TokenKind::Text.coerce("null").unwrap(),
            Scalar::Text("null".to_string())
        );
    }

    #[test]
    fn test_effective_uses_lexed_kind() {
        let mut token = Token::new(1, 1, "1", TokenKind::Int);
        token.kind = TokenKind::Symbol;
        assert_eq!(token.data.effective().unwrap(), Scalar::Int(1));
    }

    #[test]
    fn test_bad_decimal_is_mismatch() {
        assert!(matches!(
            TokenKind::Dec.coerce("1.2.3"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_none_key() {
        assert!(Data::none().is_none());
        assert!(!Data::new("a", TokenKind::Symbol).is_none());
        assert!(!Data::new("", TokenKind::Text).is_none());
    }
}
