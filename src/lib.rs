//! # korm
//!
//! A Serde-compatible reader and writer for the Korm text data format.
//!
//! ## What is Korm?
//!
//! Korm is a human-writable data format built from three node kinds: scalars,
//! lists and hashes. Every node may carry a key, keys may themselves be whole
//! documents, and a document is simply a sequence of top-level nodes:
//!
//! ```text
//! name: "Emiliee"
//! ages: [21, 22]
//! meta: { active: true, grade: 'A' }
//! ```
//!
//! ## Key Features
//!
//! - **Serde Compatible**: Works with existing Rust types via `#[derive(Serialize, Deserialize)]`
//! - **Forgiving Reads**: Entries match fields by name in any order, and unknown entries are
//!   ignored
//! - **Complex Keys**: Map keys can be lists or records, written as embedded documents
//! - **Custom Codecs**: Per-type readers and writers through the [`Korm`] engine
//! - **Configurable Layout**: Compact or multi-line output through [`KormOptions`]
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use korm::{to_string, from_str};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User {
//!     id: 123,
//!     name: "Alice".to_string(),
//!     active: true,
//! };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "id:123 name:\"Alice\" active:true");
//!
//! let user_back: User = from_str(&text).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ### Working with Documents
//!
//! A parsed [`Document`] can be inspected directly, or extracted any number
//! of times into different types:
//!
//! ```rust
//! use korm::parse;
//! use std::collections::HashMap;
//!
//! let document = parse("a: 1 b: 2").unwrap();
//! assert_eq!(document.nodes().len(), 2);
//!
//! let map: HashMap<String, u8> = document.extract().unwrap();
//! assert_eq!(map["b"], 2);
//! ```
//!
//! ### Custom Codecs
//!
//! ```rust
//! use korm::{Element, Korm, Scalar};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Version { major: u8, minor: u8 }
//!
//! let mut korm = Korm::new();
//! korm.writer_for(|_, v: &Version| {
//!     Ok(Element::Scalar(Scalar::Text(format!("{}.{}", v.major, v.minor))))
//! });
//!
//! assert_eq!(korm.push(&vec![Version { major: 1, minor: 4 }]).unwrap(), "[\"1.4\"]");
//! ```
//!
//! ## Format Reference
//!
//! See the [`grammar`] module for the full text format.
//!
//! ## Demos
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Writing and reading a record
//! - **`custom_codec.rs`** - Readers, writers and positional lists
//! - **`writer_options.rs`** - The layout presets side by side
//!
//! Run any demo with: `cargo run --example <name>`

pub mod de;
pub mod error;
pub mod grammar;
pub mod korm;
pub mod lexer;
pub mod options;
pub mod registry;
pub mod ser;
pub mod token;
pub mod typer;
pub mod value;

pub use de::ReaderContext;
pub use error::{Error, Result};
pub use korm::Korm;
pub use options::KormOptions;
pub use registry::{shape_name, Registry};
pub use ser::{Serializer, WriterContext};
pub use token::{Data, Token, TokenKind};
pub use value::{Document, Element, KormType, Scalar};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Lexes and types `text` into a [`Document`].
///
/// # Examples
///
/// ```rust
/// use korm::{parse, Scalar};
///
/// let document = parse("[1, 2, 3]").unwrap();
/// let list = document.nodes()[0].as_list().unwrap();
/// assert_eq!(list[2].as_scalar(), Some(&Scalar::Int(3)));
/// ```
///
/// # Errors
///
/// Returns [`Error::Lex`] or [`Error::Syntax`] for malformed text.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Document> {
    Document::parse(text)
}

/// Serialize any `T: Serialize` to a compact Korm string.
///
/// # Examples
///
/// ```rust
/// use korm::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "x:1 y:2");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized, such as a map with a
/// `None` key.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, KormOptions::none())
}

/// Serialize any `T: Serialize` to a multi-line Korm string.
///
/// # Examples
///
/// ```rust
/// use korm::to_string_pretty;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string_pretty(&point).unwrap(), "x: 1\ny: 2");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, KormOptions::pretty())
}

/// Serialize any `T: Serialize` to a Korm string with custom options.
///
/// # Examples
///
/// ```rust
/// use korm::{to_string_with_options, KormOptions};
///
/// let options = KormOptions::none().with_list_entry_on_new_line(true);
/// assert_eq!(to_string_with_options(&[1, 2], options).unwrap(), "[\n  1,\n  2\n]");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: KormOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Convert any `T: Serialize` to an [`Element`].
///
/// # Examples
///
/// ```rust
/// use korm::{to_element, Element, Scalar};
///
/// let element = to_element(&Some('k')).unwrap();
/// assert_eq!(element, Element::Scalar(Scalar::Char('k')));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_element<T>(value: &T) -> Result<Element>
where
    T: ?Sized + Serialize,
{
    WriterContext::new(Registry::empty(), KormOptions::none()).to_element(value)
}

/// Serialize any `T: Serialize` to a writer in Korm format.
///
/// # Examples
///
/// ```rust
/// use korm::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec!["a", "b"]).unwrap();
/// assert_eq!(buffer, b"[\"a\", \"b\"]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, KormOptions::none())
}

/// Serialize any `T: Serialize` to a writer in Korm format with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: KormOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of Korm text.
///
/// # Examples
///
/// ```rust
/// use korm::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("y: 2 x: 1").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns a fatal error with line and column information if the text is
/// malformed, or a mapping error if it cannot be deserialized to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    Document::parse(s)?.extract()
}

/// Deserialize an instance of type `T` from an I/O stream of Korm.
///
/// # Examples
///
/// ```rust
/// use korm::from_reader;
/// use std::io::Cursor;
///
/// let numbers: Vec<u16> = from_reader(Cursor::new(b"[1, 2, 3]")).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid
/// Korm, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of Korm text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid Korm, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Deserialize an instance of type `T` from an [`Element`].
///
/// # Examples
///
/// ```rust
/// use korm::{from_element, Element, Scalar};
///
/// let element = Element::Scalar(Scalar::Int(256768845));
/// assert_eq!(from_element::<i8>(&element).unwrap(), 77);
/// ```
///
/// # Errors
///
/// Returns an error if the element cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_element<T>(element: &Element) -> Result<T>
where
    T: DeserializeOwned,
{
    de::from_element_plain(element, Registry::empty())
}
