//! Error types for Korm reading and writing.
//!
//! Errors fall into two groups:
//!
//! - **Fatal parse errors**: [`Error::Lex`] and [`Error::Syntax`] abort the
//!   whole parse. They carry the line and column of the offending input.
//! - **Mapping errors**: [`Error::TypeMismatch`], [`Error::Allocation`] and
//!   [`Error::Absent`] describe a tree that parsed fine but does not fit the
//!   requested type.
//!
//! ## Examples
//!
//! ```rust
//! use korm::{from_str, Error};
//!
//! let result: Result<String, Error> = from_str("\"unterminated");
//! assert!(matches!(result, Err(Error::Lex { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing Korm.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed characters: an unterminated literal or comment, or a stray `/`
    #[error("Lex error at line {line}, column {col}: {msg}")]
    Lex { line: usize, col: usize, msg: String },

    /// Tokens that do not form a document
    #[error("Syntax error at line {line}, column {col}: {msg} `{token}`")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        token: String,
    },

    /// A node could not be coerced to the requested type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The requested type cannot be built from the entries present
    #[error("Cannot allocate: {0}")]
    Allocation(String),

    /// A required extraction produced nothing
    #[error("Result is null")]
    Absent,

    /// Unsupported value for writing
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a lex error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::Error;
    ///
    /// let err = Error::lex(3, 7, "unterminated text literal");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn lex(line: usize, col: usize, msg: &str) -> Self {
        Error::Lex {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a structural error for the token found at the given position.
    pub fn syntax(line: usize, col: usize, msg: &str, token: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            token: token.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::Error;
    ///
    /// let err = Error::type_mismatch("integer", "text \"abc\"");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors raised while lexing or typing, which abort
    /// the parse instead of a single conversion.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Error::Lex { .. } | Error::Syntax { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Error::Allocation(format!("no entry for slot `{}` and no default", field))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
