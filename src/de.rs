//! Korm deserialization.
//!
//! Text is parsed into a [`Document`] first. The node deserializer then walks
//! the borrowed tree, so the same document can be extracted any number of
//! times and as different types.
//!
//! ## Overview
//!
//! - **By-name records**: struct fields take the first entry whose key text
//!   equals the field name, in any order. Unknown entries are ignored.
//! - **Lenient scalars**: integers narrow by truncation, numeric text parses
//!   as a number, and any scalar reads as a string.
//! - **Complex values**: backtick-quoted sub-documents are parsed again when
//!   a key or element needs them.
//! - **Custom readers**: shapes registered on a [`Korm`](crate::Korm) are
//!   built by their reader instead of structurally.
//!
//! ## Usage
//!
//! ```rust
//! use korm::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str("y: 2 x: 1").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//!
//! let data: Data = from_str("{ x: 1, y: 2, z: 3 }").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```
//!
//! ## Document Roots
//!
//! A document holding a single unnamed node is that node. Otherwise a
//! record or map is read from all top-level entries, while a scalar or list
//! is read from the value of a single keyed entry.
//!
//! ```rust
//! use korm::from_str;
//!
//! let nums: Vec<i32> = from_str("[1, 2, 3]").unwrap();
//! assert_eq!(nums, vec![1, 2, 3]);
//!
//! let nums: Vec<i32> = from_str("numbers: [1, 2, 3]").unwrap();
//! assert_eq!(nums, vec![1, 2, 3]);
//! ```

use crate::registry::Registry;
use crate::token::Data;
use crate::value::{Document, Element, KormType, Scalar};
use crate::{Error, Result};
use log::{debug, trace};
use num_bigint::{BigInt, Sign};
use serde::de::value::{StrDeserializer, StringDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, Deserialize, Deserializer as _};
use std::borrow::Cow;
use std::cell::RefCell;

/// Maps a whole document onto `T`.
pub(crate) fn extract<T: DeserializeOwned>(document: &Document, registry: &Registry) -> Result<T> {
    let ctx = ReaderContext::new(registry);
    T::deserialize(NodeDeserializer::new(Node::Root(document.nodes()), &ctx))
}

/// Maps an element onto `T` ignoring custom readers.
pub(crate) fn from_element_plain<T: DeserializeOwned>(
    element: &Element,
    registry: &Registry,
) -> Result<T> {
    let ctx = ReaderContext::plain(registry);
    T::deserialize(NodeDeserializer::new(Node::of_element(element), &ctx))
}

/// The state a custom reader runs in.
///
/// Passed to readers registered with [`Korm::reader_for`](crate::Korm::reader_for).
/// Nested values mapped through the context use their own custom readers.
/// A reader that maps its own shape again gets the structural mapping.
pub struct ReaderContext<'r> {
    pub(crate) registry: &'r Registry,
    codecs: bool,
    active: RefCell<Vec<&'static str>>,
}

impl<'r> ReaderContext<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        ReaderContext {
            registry,
            codecs: true,
            active: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn plain(registry: &'r Registry) -> Self {
        ReaderContext {
            codecs: false,
            ..ReaderContext::new(registry)
        }
    }

    /// Maps the value of one node onto `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not fit `T`.
    pub fn map<T: DeserializeOwned>(&self, node: &KormType) -> Result<T> {
        T::deserialize(NodeDeserializer::new(Node::of(node), self))
    }

    /// Maps a list element onto `T`.
    pub fn map_element<T: DeserializeOwned>(&self, element: &Element) -> Result<T> {
        T::deserialize(NodeDeserializer::new(Node::of_element(element), self))
    }

    /// Maps entries onto `T` as if they were the body of a hash.
    pub fn map_entries<T: DeserializeOwned>(&self, entries: &[KormType]) -> Result<T> {
        T::deserialize(NodeDeserializer::new(Node::Hash(entries), self))
    }

    /// The first entry whose key text is `name`.
    #[must_use]
    pub fn by_name<'k>(entries: &'k [KormType], name: &str) -> Option<&'k KormType> {
        entries.iter().find(|entry| entry.key().raw == name)
    }
}

#[derive(Clone, Copy, Debug)]
enum Node<'a> {
    Scalar(&'a Scalar),
    List(&'a [Element]),
    Hash(&'a [KormType]),
    /// The top-level nodes of a document, resolved per requested type.
    Root(&'a [KormType]),
    /// A hash key, coerced when it is read.
    Key(&'a Data),
}

impl<'a> Node<'a> {
    fn of(korm: &'a KormType) -> Self {
        match korm {
            KormType::Base { data, .. } => Node::Scalar(data),
            KormType::List { data, .. } => Node::List(data),
            KormType::Hash { data, .. } => Node::Hash(data),
        }
    }

    fn of_element(element: &'a Element) -> Self {
        match element {
            Element::Scalar(scalar) => Node::Scalar(scalar),
            Element::Korm(korm) => Node::of(korm),
        }
    }

    fn describe(self) -> String {
        match self {
            Node::Scalar(scalar) => scalar.describe(),
            Node::List(_) => "list".to_string(),
            Node::Hash([]) | Node::Root([]) => "empty hash".to_string(),
            Node::Hash(_) | Node::Root(_) => "hash".to_string(),
            Node::Key(data) => format!("key {}", data.raw),
        }
    }

    /// An unnamed copy of the node.
    fn to_korm(self) -> KormType {
        match self {
            Node::Scalar(scalar) => KormType::Base {
                key: Data::none(),
                data: scalar.clone(),
            },
            Node::List(elements) => KormType::List {
                key: Data::none(),
                data: elements.to_vec(),
            },
            Node::Hash(entries) | Node::Root(entries) => KormType::Hash {
                key: Data::none(),
                data: entries.to_vec(),
            },
            Node::Key(data) => KormType::Base {
                key: Data::none(),
                data: data
                    .effective()
                    .unwrap_or_else(|_| Scalar::Text(data.raw.clone())),
            },
        }
    }
}

enum Expanded {
    Document(Document),
    Scalar(Scalar),
}

/// Re-targets the call at an expanded key or complex value, if any.
macro_rules! expand {
    ($self:ident, $keep_complex:expr, $method:ident($($arg:expr),*)) => {
        if let Some(expanded) = $self.expand($keep_complex)? {
            let ctx = $self.ctx;
            return match expanded {
                Expanded::Document(document) => {
                    NodeDeserializer::new(Node::Root(document.nodes()), ctx).$method($($arg),*)
                }
                Expanded::Scalar(scalar) => {
                    NodeDeserializer::new(Node::Scalar(&scalar), ctx).$method($($arg),*)
                }
            };
        }
    };
}

/// Hands the call to a custom reader registered for `$name`, if any.
macro_rules! pull_custom {
    ($self:ident, $name:expr, $method:ident($($arg:expr),*)) => {
        if let Some(element) = $self.custom($name)? {
            let plain = ReaderContext::plain($self.ctx.registry);
            return NodeDeserializer::new(Node::of_element(&element), &plain).$method($($arg),*);
        }
    };
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {$(
        fn $method<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            expand!(self, false, $method(visitor));
            let value = match self.scalar(stringify!($ty))? {
                Scalar::Dec(d) => *d as $ty,
                other => integer_bits(other, stringify!($ty))? as $ty,
            };
            visitor.$visit(value)
        }
    )*};
}

/// Deserializes Rust values from a borrowed Korm tree.
pub(crate) struct NodeDeserializer<'a> {
    node: Node<'a>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> NodeDeserializer<'a> {
    fn new(node: Node<'a>, ctx: &'a ReaderContext<'a>) -> Self {
        NodeDeserializer { node, ctx }
    }

    fn expand(&self, keep_complex: bool) -> Result<Option<Expanded>> {
        match self.node {
            Node::Key(data) => match data.effective()? {
                Scalar::Complex(raw) if !keep_complex => {
                    Ok(Some(Expanded::Document(Document::parse(&raw)?)))
                }
                scalar => Ok(Some(Expanded::Scalar(scalar))),
            },
            Node::Scalar(Scalar::Complex(raw)) if !keep_complex => {
                Ok(Some(Expanded::Document(Document::parse(raw)?)))
            }
            _ => Ok(None),
        }
    }

    /// Resolves a document root. Records take every top-level entry, other
    /// shapes take the value of a single entry.
    fn resolve(&self, record: bool) -> Node<'a> {
        match self.node {
            Node::Root(nodes) => match nodes {
                [single] if single.key().is_none() || !record => Node::of(single),
                _ => Node::Hash(nodes),
            },
            node => node,
        }
    }

    fn scalar(&self, expected: &str) -> Result<&'a Scalar> {
        match self.resolve(false) {
            Node::Scalar(scalar) => Ok(scalar),
            other => Err(Error::type_mismatch(expected, &other.describe())),
        }
    }

    fn mismatch(&self, expected: &str, record: bool) -> Error {
        Error::type_mismatch(expected, &self.resolve(record).describe())
    }

    /// Runs the custom reader registered for `name`. The reader sees the
    /// entries of a hash, or any other node as a single unnamed entry.
    fn custom(&self, name: &'static str) -> Result<Option<Element>> {
        let ctx = self.ctx;
        if !ctx.codecs {
            return Ok(None);
        }
        let reader = match ctx.registry.reader(name) {
            Some(reader) => reader,
            None => return Ok(None),
        };
        if ctx.active.borrow().contains(&name) {
            debug!("reader for {} is already active, mapping structurally", name);
            return Ok(None);
        }

        let entries: Cow<'_, [KormType]> = match self.resolve(true) {
            Node::Hash(entries) => Cow::Borrowed(entries),
            other => Cow::Owned(vec![other.to_korm()]),
        };

        trace!("custom reader for {}", name);
        ctx.active.borrow_mut().push(name);
        let result = reader(ctx, &entries);
        ctx.active.borrow_mut().pop();
        result.map(Some)
    }

    fn visit_record<'de, V: de::Visitor<'de>>(
        self,
        name: Option<&'static str>,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        expand!(self, false, visit_record(name, fields, visitor));
        match self.resolve(true) {
            Node::Hash(entries) => {
                visitor.visit_map(StructDeserializer::new(entries, fields, self.ctx))
            }
            Node::List(elements) => {
                let registry = self.ctx.registry;
                let order = match name.and_then(|name| registry.positional(name)) {
                    Some(order) => order,
                    None => return Err(self.mismatch("hash", true)),
                };
                let slots: Vec<&str> = if order.is_empty() {
                    fields.to_vec()
                } else {
                    order.iter().map(String::as_str).collect()
                };
                visitor.visit_map(PositionalDeserializer::new(slots, elements, self.ctx))
            }
            _ => Err(self.mismatch("hash", true)),
        }
    }

    fn visit_tuple<'de, V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.resolve(false) {
            Node::List(elements) => {
                visitor.visit_seq(SeqDeserializer::elements(elements, self.ctx))
            }
            _ => match self.resolve(true) {
                Node::Hash(entries) => match pair(entries) {
                    Some((first, second)) => visitor.visit_seq(SeqDeserializer::new(
                        vec![Node::of(first), Node::of(second)],
                        self.ctx,
                    )),
                    None => Err(self.mismatch("list or pair", true)),
                },
                _ => Err(self.mismatch("list", false)),
            },
        }
    }
}

/// The two entries of a loose pair: `first`/`second` or `key`/`value`.
fn pair(entries: &[KormType]) -> Option<(&KormType, &KormType)> {
    if entries.len() != 2 {
        return None;
    }
    [("first", "second"), ("key", "value")]
        .iter()
        .find_map(|(a, b)| {
            Some((
                ReaderContext::by_name(entries, a)?,
                ReaderContext::by_name(entries, b)?,
            ))
        })
}

/// The low 128 bits of an integer-like scalar, two's complement.
fn integer_bits(scalar: &Scalar, expected: &str) -> Result<i128> {
    match scalar {
        Scalar::Int(i) => Ok(i128::from(*i)),
        Scalar::BigInt(big) => Ok(low_bits(big)),
        Scalar::Text(s) | Scalar::Symbol(s) => {
            let text = s.trim();
            if let Ok(value) = text.parse::<i128>() {
                return Ok(value);
            }
            text.parse::<BigInt>()
                .map(|big| low_bits(&big))
                .map_err(|_| Error::type_mismatch(expected, &scalar.describe()))
        }
        other => Err(Error::type_mismatch(expected, &other.describe())),
    }
}

fn low_bits(big: &BigInt) -> i128 {
    let (sign, digits) = big.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0) as u128;
    let high = digits.get(1).copied().unwrap_or(0) as u128;
    let bits = low | (high << 64);
    let bits = if sign == Sign::Minus {
        bits.wrapping_neg()
    } else {
        bits
    };
    bits as i128
}

fn float_of(scalar: &Scalar, expected: &str) -> Result<f64> {
    let parsed = match scalar {
        Scalar::Dec(d) => return Ok(*d),
        Scalar::Int(i) => return Ok(*i as f64),
        Scalar::BigInt(big) => big.to_string().parse::<f64>(),
        Scalar::Text(s) | Scalar::Symbol(s) => s.trim().parse::<f64>(),
        other => return Err(Error::type_mismatch(expected, &other.describe())),
    };
    parsed.map_err(|_| Error::type_mismatch(expected, &scalar.describe()))
}

/// Text of a scalar read where a string is expected.
fn text_of(scalar: &Scalar) -> Option<Cow<'_, str>> {
    match scalar {
        Scalar::Null => None,
        Scalar::Text(s) | Scalar::Symbol(s) | Scalar::Complex(s) => Some(Cow::Borrowed(s)),
        Scalar::Bool(b) => Some(Cow::Owned(b.to_string())),
        Scalar::Int(i) => Some(Cow::Owned(i.to_string())),
        Scalar::BigInt(i) => Some(Cow::Owned(i.to_string())),
        Scalar::Dec(d) => Some(Cow::Owned(d.to_string())),
        Scalar::Char(c) => Some(Cow::Owned(c.to_string())),
    }
}

/// Exact match first, then ignoring ASCII case.
fn variant_name(text: &str, variants: &'static [&'static str]) -> String {
    variants
        .iter()
        .find(|variant| **variant == text)
        .or_else(|| variants.iter().find(|variant| variant.eq_ignore_ascii_case(text)))
        .map_or_else(|| text.to_string(), |variant| variant.to_string())
}

impl<'de, 'a> de::Deserializer<'de> for NodeDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_any(visitor));
        match self.resolve(true) {
            Node::Scalar(scalar) => match scalar {
                Scalar::Null => visitor.visit_unit(),
                Scalar::Bool(b) => visitor.visit_bool(*b),
                Scalar::Int(i) => visitor.visit_i64(*i),
                Scalar::BigInt(big) => {
                    if let Ok(value) = u64::try_from(big) {
                        visitor.visit_u64(value)
                    } else if let Ok(value) = i128::try_from(big) {
                        visitor.visit_i128(value)
                    } else if let Ok(value) = u128::try_from(big) {
                        visitor.visit_u128(value)
                    } else {
                        visitor.visit_string(big.to_string())
                    }
                }
                Scalar::Dec(d) => visitor.visit_f64(*d),
                Scalar::Char(c) => visitor.visit_char(*c),
                Scalar::Text(s) | Scalar::Symbol(s) | Scalar::Complex(s) => visitor.visit_str(s),
            },
            Node::List(elements) => {
                visitor.visit_seq(SeqDeserializer::elements(elements, self.ctx))
            }
            Node::Hash(entries) | Node::Root(entries) => {
                visitor.visit_map(MapDeserializer::new(entries, self.ctx))
            }
            Node::Key(data) => visitor.visit_str(&data.raw),
        }
    }

    fn deserialize_bool<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_bool(visitor));
        let scalar = self.scalar("boolean")?;
        match scalar {
            Scalar::Bool(b) => visitor.visit_bool(*b),
            Scalar::Text(s) | Scalar::Symbol(s) => match s.trim().parse::<bool>() {
                Ok(b) => visitor.visit_bool(b),
                Err(_) => Err(Error::type_mismatch("boolean", &scalar.describe())),
            },
            other => Err(Error::type_mismatch("boolean", &other.describe())),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    }

    fn deserialize_f32<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_f32(visitor));
        visitor.visit_f32(float_of(self.scalar("f32")?, "f32")? as f32)
    }

    fn deserialize_f64<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_f64(visitor));
        visitor.visit_f64(float_of(self.scalar("f64")?, "f64")?)
    }

    fn deserialize_char<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_char(visitor));
        let scalar = self.scalar("char")?;
        match scalar {
            Scalar::Char(c) => visitor.visit_char(*c),
            Scalar::Text(s) | Scalar::Symbol(s) => match s.chars().next() {
                Some(c) => visitor.visit_char(c),
                None => Err(Error::type_mismatch("char", &scalar.describe())),
            },
            other => Err(Error::type_mismatch("char", &other.describe())),
        }
    }

    fn deserialize_str<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, true, deserialize_str(visitor));
        let scalar = self.scalar("string")?;
        match text_of(scalar) {
            Some(Cow::Borrowed(text)) => visitor.visit_str(text),
            Some(Cow::Owned(text)) => visitor.visit_string(text),
            None => Err(Error::type_mismatch("string", &scalar.describe())),
        }
    }

    fn deserialize_string<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_bytes(visitor));
        match self.resolve(false) {
            Node::List(elements) => {
                visitor.visit_seq(SeqDeserializer::elements(elements, self.ctx))
            }
            Node::Scalar(Scalar::Text(s)) => visitor.visit_bytes(s.as_bytes()),
            other => Err(Error::type_mismatch("bytes", &other.describe())),
        }
    }

    fn deserialize_byte_buf<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_option(visitor));
        // A keyed document is present even when its only entry is null.
        match (self.node, self.resolve(true)) {
            (Node::Root([]), _) | (_, Node::Scalar(Scalar::Null)) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_unit(visitor));
        match self.resolve(false) {
            Node::Scalar(Scalar::Null) | Node::Hash([]) => visitor.visit_unit(),
            other => Err(Error::type_mismatch("null", &other.describe())),
        }
    }

    fn deserialize_unit_struct<V: de::Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        expand!(self, false, deserialize_unit_struct(name, visitor));
        pull_custom!(self, name, deserialize_unit_struct(name, visitor));
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: de::Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        expand!(self, false, deserialize_newtype_struct(name, visitor));
        pull_custom!(self, name, deserialize_newtype_struct(name, visitor));
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_seq(visitor));
        match self.resolve(false) {
            Node::List(elements) => {
                visitor.visit_seq(SeqDeserializer::elements(elements, self.ctx))
            }
            other => Err(Error::type_mismatch("list", &other.describe())),
        }
    }

    fn deserialize_tuple<V: de::Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        expand!(self, false, visit_tuple(visitor));
        self.visit_tuple(visitor)
    }

    fn deserialize_tuple_struct<V: de::Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        expand!(self, false, deserialize_tuple_struct(name, len, visitor));
        pull_custom!(self, name, deserialize_tuple_struct(name, len, visitor));
        self.visit_tuple(visitor)
    }

    fn deserialize_map<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        expand!(self, false, deserialize_map(visitor));
        match self.resolve(true) {
            Node::Hash(entries) => visitor.visit_map(MapDeserializer::new(entries, self.ctx)),
            other => Err(Error::type_mismatch("hash", &other.describe())),
        }
    }

    fn deserialize_struct<V: de::Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        expand!(self, false, deserialize_struct(name, fields, visitor));
        pull_custom!(self, name, deserialize_struct(name, fields, visitor));
        self.visit_record(Some(name), fields, visitor)
    }

    fn deserialize_enum<V: de::Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        expand!(self, false, deserialize_enum(name, variants, visitor));
        pull_custom!(self, name, deserialize_enum(name, variants, visitor));
        match self.resolve(true) {
            Node::Scalar(Scalar::Text(s) | Scalar::Symbol(s)) => visitor.visit_enum(
                EnumDeserializer::new(variant_name(s, variants), None, self.ctx),
            ),
            Node::Scalar(Scalar::Int(index)) => {
                let variant = usize::try_from(*index)
                    .ok()
                    .and_then(|index| variants.get(index))
                    .ok_or_else(|| {
                        Error::type_mismatch("enum variant", &format!("integer {}", index))
                    })?;
                visitor.visit_enum(EnumDeserializer::new(variant.to_string(), None, self.ctx))
            }
            Node::Hash([entry]) => {
                let key = &entry.key().raw;
                let is_variant = variants.iter().any(|v| v.eq_ignore_ascii_case(key));
                if is_variant || !matches!(self.node, Node::Root(_)) {
                    visitor.visit_enum(EnumDeserializer::new(
                        variant_name(key, variants),
                        Some(Node::of(entry)),
                        self.ctx,
                    ))
                } else {
                    NodeDeserializer::new(Node::of(entry), self.ctx)
                        .deserialize_enum(name, variants, visitor)
                }
            }
            other => Err(Error::type_mismatch("enum variant", &other.describe())),
        }
    }

    fn deserialize_identifier<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct SeqDeserializer<'a> {
    iter: std::vec::IntoIter<Node<'a>>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> SeqDeserializer<'a> {
    fn new(nodes: Vec<Node<'a>>, ctx: &'a ReaderContext<'a>) -> Self {
        SeqDeserializer {
            iter: nodes.into_iter(),
            ctx,
        }
    }

    fn elements(elements: &'a [Element], ctx: &'a ReaderContext<'a>) -> Self {
        SeqDeserializer::new(elements.iter().map(Node::of_element).collect(), ctx)
    }
}

impl<'de, 'a> de::SeqAccess<'de> for SeqDeserializer<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => seed.deserialize(NodeDeserializer::new(node, self.ctx)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Map entries in document order, with keys coerced on demand.
struct MapDeserializer<'a> {
    iter: std::slice::Iter<'a, KormType>,
    value: Option<&'a KormType>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> MapDeserializer<'a> {
    fn new(entries: &'a [KormType], ctx: &'a ReaderContext<'a>) -> Self {
        MapDeserializer {
            iter: entries.iter(),
            value: None,
            ctx,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for MapDeserializer<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(entry) => {
                self.value = Some(entry);
                seed.deserialize(NodeDeserializer::new(Node::Key(entry.key()), self.ctx))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(entry) => seed.deserialize(NodeDeserializer::new(Node::of(entry), self.ctx)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Record fields matched by name. Each field takes the first unmatched entry
/// with its name, fields without an entry are left to serde's defaults.
struct StructDeserializer<'a> {
    entries: &'a [KormType],
    fields: std::slice::Iter<'static, &'static str>,
    matched: Vec<bool>,
    value: Option<&'a KormType>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> StructDeserializer<'a> {
    fn new(
        entries: &'a [KormType],
        fields: &'static [&'static str],
        ctx: &'a ReaderContext<'a>,
    ) -> Self {
        StructDeserializer {
            entries,
            fields: fields.iter(),
            matched: vec![false; entries.len()],
            value: None,
            ctx,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for StructDeserializer<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let entries = self.entries;
        while let Some(field) = self.fields.next() {
            let found = entries
                .iter()
                .enumerate()
                .position(|(index, entry)| !self.matched[index] && entry.key().raw == *field);
            if let Some(index) = found {
                self.matched[index] = true;
                self.value = Some(&entries[index]);
                let key: StrDeserializer<'static, Error> = field.into_deserializer();
                return seed.deserialize(key).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(entry) => seed.deserialize(NodeDeserializer::new(Node::of(entry), self.ctx)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

/// Record fields read from list elements in slot order.
struct PositionalDeserializer<'a> {
    slots: std::iter::Zip<std::vec::IntoIter<&'a str>, std::slice::Iter<'a, Element>>,
    value: Option<&'a Element>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> PositionalDeserializer<'a> {
    fn new(slots: Vec<&'a str>, elements: &'a [Element], ctx: &'a ReaderContext<'a>) -> Self {
        PositionalDeserializer {
            slots: slots.into_iter().zip(elements.iter()),
            value: None,
            ctx,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for PositionalDeserializer<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.slots.next() {
            Some((slot, element)) => {
                self.value = Some(element);
                let key: StrDeserializer<'a, Error> = slot.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(element) => {
                seed.deserialize(NodeDeserializer::new(Node::of_element(element), self.ctx))
            }
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

struct EnumDeserializer<'a> {
    variant: String,
    value: Option<Node<'a>>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> EnumDeserializer<'a> {
    fn new(variant: String, value: Option<Node<'a>>, ctx: &'a ReaderContext<'a>) -> Self {
        EnumDeserializer {
            variant,
            value,
            ctx,
        }
    }
}

impl<'de, 'a> de::EnumAccess<'de> for EnumDeserializer<'a> {
    type Error = Error;
    type Variant = VariantDeserializer<'a>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let key: StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(key)?;
        let access = VariantDeserializer {
            value: self.value,
            ctx: self.ctx,
        };
        Ok((variant, access))
    }
}

struct VariantDeserializer<'a> {
    value: Option<Node<'a>>,
    ctx: &'a ReaderContext<'a>,
}

impl<'a> VariantDeserializer<'a> {
    fn content(&self, expected: &str) -> Result<NodeDeserializer<'a>> {
        match self.value {
            Some(node) => Ok(NodeDeserializer::new(node, self.ctx)),
            None => Err(Error::type_mismatch(expected, "unit variant")),
        }
    }
}

impl<'de, 'a> de::VariantAccess<'de> for VariantDeserializer<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(node) => <()>::deserialize(NodeDeserializer::new(node, self.ctx)),
            None => Ok(()),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.content("newtype variant")?)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.content("tuple variant")?.deserialize_tuple(len, visitor)
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.content("struct variant")?
            .visit_record(None, fields, visitor)
    }
}
