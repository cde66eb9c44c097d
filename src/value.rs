//! The Korm value tree.
//!
//! The [typer](crate::typer) turns tokens into a [`Document`]: an ordered list
//! of [`KormType`] nodes. Every mapping in either direction goes through this
//! tree.
//!
//! ## Core Types
//!
//! - [`KormType`]: a node with a key. `Base` holds a scalar, `List` holds
//!   elements, `Hash` holds keyed entries.
//! - [`Element`]: one element of a list, either a bare [`Scalar`] or a nested
//!   unkeyed node.
//! - [`Scalar`]: a leaf value.
//! - [`Document`]: the top-level nodes of one parse.
//!
//! ## Usage
//!
//! ```rust
//! use korm::{parse, KormType, Scalar};
//!
//! let document = parse("name: \"Emiliee\" ages: [1, 2]").unwrap();
//! let nodes = document.nodes();
//! assert_eq!(nodes.len(), 2);
//! assert_eq!(nodes[0].key().raw, "name");
//! assert_eq!(nodes[0].as_scalar(), Some(&Scalar::Text("Emiliee".to_string())));
//! assert!(matches!(nodes[1], KormType::List { .. }));
//! ```
//!
//! ### Converting from Rust Types
//!
//! ```rust
//! use korm::{to_element, Element};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let element = to_element(&Point { x: 10, y: 20 }).unwrap();
//! assert_eq!(element.to_string(), "{ x:10 y:20 }");
//! ```

use crate::options::KormOptions;
use crate::registry::Registry;
use crate::ser::{key_data, Writer};
use crate::token::{Data, TokenKind};
use crate::{lexer, typer, Error, Result};
use indexmap::IndexMap;
use log::debug;
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;

/// A leaf value.
///
/// `Null` is the explicit null marker, written `null`. It is distinct from a
/// missing entry.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Dec(f64),
    Char(char),
    Text(String),
    /// A bare word, such as an enum variant name.
    Symbol(String),
    /// The raw text of an embedded sub-document, decoded on demand.
    Complex(String),
}

impl Scalar {
    /// Short description used in mismatch errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            Scalar::Null => "null".to_string(),
            Scalar::Bool(b) => format!("boolean {}", b),
            Scalar::Int(i) => format!("integer {}", i),
            Scalar::BigInt(i) => format!("integer {}", i),
            Scalar::Dec(d) => format!("decimal {}", d),
            Scalar::Char(c) => format!("char '{}'", c),
            Scalar::Text(s) => format!("text \"{}\"", s),
            Scalar::Symbol(s) => format!("symbol {}", s),
            Scalar::Complex(s) => format!("complex `{}`", s),
        }
    }

    /// The scalar as text, if it is text-like.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) | Scalar::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

/// A node of the value tree.
///
/// `key` is [`Data::none`] for unnamed nodes: top-level values and nested
/// lists or hashes inside a list.
#[derive(Clone, Debug, PartialEq)]
pub enum KormType {
    Base { key: Data, data: Scalar },
    List { key: Data, data: Vec<Element> },
    Hash { key: Data, data: Vec<KormType> },
}

/// One element of a list.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Scalar(Scalar),
    Korm(KormType),
}

impl KormType {
    /// A scalar entry keyed by a bare symbol.
    #[must_use]
    pub fn base(key: &str, data: Scalar) -> Self {
        KormType::Base {
            key: Data::new(key, TokenKind::Symbol),
            data,
        }
    }

    /// A list entry keyed by a bare symbol.
    #[must_use]
    pub fn list(key: &str, data: Vec<Element>) -> Self {
        KormType::List {
            key: Data::new(key, TokenKind::Symbol),
            data,
        }
    }

    /// A hash entry keyed by a bare symbol.
    #[must_use]
    pub fn hash(key: &str, data: Vec<KormType>) -> Self {
        KormType::Hash {
            key: Data::new(key, TokenKind::Symbol),
            data,
        }
    }

    #[must_use]
    pub fn key(&self) -> &Data {
        match self {
            KormType::Base { key, .. }
            | KormType::List { key, .. }
            | KormType::Hash { key, .. } => key,
        }
    }

    pub(crate) fn key_mut(&mut self) -> &mut Data {
        match self {
            KormType::Base { key, .. }
            | KormType::List { key, .. }
            | KormType::Hash { key, .. } => key,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            KormType::Base { data, .. } => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            KormType::List { data, .. } => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_hash(&self) -> Option<&[KormType]> {
        match self {
            KormType::Hash { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Finds the first entry of a hash whose key text is `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::parse;
    ///
    /// let document = parse("{ a: 1 b: 2 }").unwrap();
    /// let hash = &document.nodes()[0];
    /// assert!(hash.get("b").is_some());
    /// assert!(hash.get("c").is_none());
    /// ```
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KormType> {
        self.as_hash()?.iter().find(|entry| entry.key().raw == name)
    }

    /// Drops the key, keeping the value.
    #[must_use]
    pub fn into_element(self) -> Element {
        match self {
            KormType::Base { data, .. } => Element::Scalar(data),
            KormType::List { data, .. } => Element::Korm(KormType::List {
                key: Data::none(),
                data,
            }),
            KormType::Hash { data, .. } => Element::Korm(KormType::Hash {
                key: Data::none(),
                data,
            }),
        }
    }
}

impl Element {
    /// Attaches a key, turning the element into a hash entry.
    #[must_use]
    pub fn into_korm(self, key: Data) -> KormType {
        match self {
            Element::Scalar(data) => KormType::Base { key, data },
            Element::Korm(mut korm) => {
                *korm.key_mut() = key;
                korm
            }
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Element::Scalar(scalar) => Some(scalar),
            Element::Korm(korm) => korm.as_scalar(),
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Element::Korm(korm) => korm.as_list(),
            Element::Scalar(_) => None,
        }
    }

    #[must_use]
    pub fn as_hash(&self) -> Option<&[KormType]> {
        match self {
            Element::Korm(korm) => korm.as_hash(),
            Element::Scalar(_) => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Element::Scalar(Scalar::Null))
    }

    /// Lists and hashes, as opposed to scalars.
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(
            self,
            Element::Korm(KormType::List { .. } | KormType::Hash { .. })
        )
    }
}

impl From<Scalar> for Element {
    fn from(value: Scalar) -> Self {
        Element::Scalar(value)
    }
}

impl From<KormType> for Element {
    fn from(value: KormType) -> Self {
        value.into_element()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = KormOptions::none();
        let mut writer = Writer::new(&options);
        writer.write_element(self);
        f.write_str(&writer.finish())
    }
}

impl fmt::Display for KormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = KormOptions::none();
        let mut writer = Writer::new(&options);
        if self.key().is_none() {
            writer.write_element(&self.clone().into_element());
        } else {
            writer.write_entry(self);
        }
        f.write_str(&writer.finish())
    }
}

/// The top-level nodes of one parsed text.
///
/// Extraction never mutates the document, so the same document can be
/// extracted any number of times.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    nodes: Vec<KormType>,
}

impl Document {
    #[must_use]
    pub fn new(nodes: Vec<KormType>) -> Self {
        Document { nodes }
    }

    /// Lexes and types `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lex`] or [`Error::Syntax`] for malformed text.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = lexer::tokenize(text)?;
        let nodes = typer::type_tokens(tokens)?;
        Ok(Document::new(nodes))
    }

    #[must_use]
    pub fn nodes(&self) -> &[KormType] {
        &self.nodes
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<KormType> {
        self.nodes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document as one element: its single unnamed node, or otherwise an
    /// unnamed hash of all nodes.
    #[must_use]
    pub fn root(&self) -> Element {
        match self.nodes.as_slice() {
            [single] if single.key().is_none() => single.clone().into_element(),
            nodes => Element::Korm(KormType::Hash {
                key: Data::none(),
                data: nodes.to_vec(),
            }),
        }
    }

    /// Maps the document onto `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree does not fit `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        crate::de::extract(self, Registry::empty())
    }

    /// Maps the document onto `T`, turning any failure into `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::parse;
    ///
    /// let document = parse("[1, 2, 3]").unwrap();
    /// assert_eq!(document.extract_as::<Vec<u8>>(), Some(vec![1, 2, 3]));
    /// assert_eq!(document.extract_as::<bool>(), None);
    /// ```
    #[must_use]
    pub fn extract_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.extract()
            .map_err(|e| debug!("extraction absorbed: {}", e))
            .ok()
    }

    /// Maps the document onto a list of `T`.
    pub fn extract_list<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.extract()
    }

    /// Maps the document onto a map, keeping document order.
    pub fn extract_map<K, V>(&self) -> Result<IndexMap<K, V>>
    where
        K: DeserializeOwned + Hash + Eq,
        V: DeserializeOwned,
    {
        self.extract()
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::BigInt(i) => match i128::try_from(i) {
                Ok(small) => serializer.serialize_i128(small),
                Err(_) => match u128::try_from(i) {
                    Ok(big) => serializer.serialize_u128(big),
                    Err(_) => serializer.serialize_str(&i.to_string()),
                },
            },
            Scalar::Dec(d) => serializer.serialize_f64(*d),
            Scalar::Char(c) => serializer.serialize_char(*c),
            Scalar::Text(s) | Scalar::Symbol(s) => serializer.serialize_str(s),
            Scalar::Complex(raw) => match Document::parse(raw) {
                Ok(document) => document.root().serialize(serializer),
                Err(_) => serializer.serialize_str(raw),
            },
        }
    }
}

impl Serialize for Data {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.effective() {
            Ok(scalar) => scalar.serialize(serializer),
            Err(_) => serializer.serialize_str(&self.raw),
        }
    }
}

impl Serialize for KormType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            KormType::Base { data, .. } => data.serialize(serializer),
            KormType::List { data, .. } => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(data.len()))?;
                for element in data {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            KormType::Hash { data, .. } => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(data.len()))?;
                for entry in data {
                    map.serialize_entry(&KeyOf(entry.key()), &ValueOf(entry))?;
                }
                map.end()
            }
        }
    }
}

/// Newtype name marking complex key text, so the Korm serializer can keep it
/// complex while other serializers see a plain string.
pub(crate) const COMPLEX_TOKEN: &str = "$korm::private::Complex";

/// Serializes a hash key. Complex keys go out as their raw text.
struct KeyOf<'a>(&'a Data);

impl Serialize for KeyOf<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.kind {
            TokenKind::Complex => {
                serializer.serialize_newtype_struct(COMPLEX_TOKEN, &self.0.raw)
            }
            _ => self.0.serialize(serializer),
        }
    }
}

/// Serializes a node without its key.
struct ValueOf<'a>(&'a KormType);

impl Serialize for ValueOf<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Element::Scalar(scalar) => scalar.serialize(serializer),
            Element::Korm(korm) => korm.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ElementVisitor;

        impl<'de> Visitor<'de> for ElementVisitor {
            type Value = Element;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid Korm value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Element, E> {
                Ok(Scalar::Bool(value).into())
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Element, E> {
                Ok(Scalar::Int(value).into())
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Element, E> {
                Ok(match i64::try_from(value) {
                    Ok(small) => Scalar::Int(small),
                    Err(_) => Scalar::BigInt(BigInt::from(value)),
                }
                .into())
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Element, E> {
                Ok(match i64::try_from(value) {
                    Ok(small) => Scalar::Int(small),
                    Err(_) => Scalar::BigInt(BigInt::from(value)),
                }
                .into())
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Element, E> {
                Ok(match i64::try_from(value) {
                    Ok(small) => Scalar::Int(small),
                    Err(_) => Scalar::BigInt(BigInt::from(value)),
                }
                .into())
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Element, E> {
                Ok(Scalar::Dec(value).into())
            }

            fn visit_char<E>(self, value: char) -> std::result::Result<Element, E> {
                Ok(Scalar::Char(value).into())
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Element, E> {
                Ok(Scalar::Text(value.to_string()).into())
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Element, E> {
                Ok(Scalar::Text(value).into())
            }

            fn visit_unit<E>(self) -> std::result::Result<Element, E> {
                Ok(Scalar::Null.into())
            }

            fn visit_none<E>(self) -> std::result::Result<Element, E> {
                Ok(Scalar::Null.into())
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Element, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Element, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut data = Vec::new();
                while let Some(element) = seq.next_element()? {
                    data.push(element);
                }
                Ok(Element::Korm(KormType::List {
                    key: Data::none(),
                    data,
                }))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Element, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let options = KormOptions::none();
                let mut data = Vec::new();
                while let Some((key, value)) = map.next_entry::<Element, Element>()? {
                    let key = key_data(&key, &options).map_err(de::Error::custom)?;
                    data.push(value.into_korm(key));
                }
                Ok(Element::Korm(KormType::Hash {
                    key: Data::none(),
                    data,
                }))
            }
        }

        deserializer.deserialize_any(ElementVisitor)
    }
}

impl<'de> Deserialize<'de> for KormType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Element::deserialize(deserializer).map(|element| element.into_korm(Data::none()))
    }
}

impl TryFrom<Element> for KormType {
    type Error = Error;

    fn try_from(value: Element) -> Result<Self> {
        match value {
            Element::Korm(korm) => Ok(korm),
            Element::Scalar(scalar) => Err(Error::type_mismatch(
                "list or hash",
                &scalar.describe(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_single_unnamed_node() {
        let document = Document::parse("[1, 2]").unwrap();
        let root = document.root();
        assert_eq!(root.as_list().map(<[Element]>::len), Some(2));
    }

    #[test]
    fn test_root_merges_keyed_nodes() {
        let document = Document::parse("a: 1 b: 2").unwrap();
        let root = document.root();
        let entries = root.as_hash().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].key().raw, "b");
    }

    #[test]
    fn test_into_korm_and_back() {
        let element = Element::Scalar(Scalar::Int(3));
        let korm = element.clone().into_korm(Data::new("x", TokenKind::Symbol));
        assert_eq!(korm.key().raw, "x");
        assert_eq!(korm.into_element(), element);
    }

    #[test]
    fn test_display_entry() {
        let korm = KormType::Base {
            key: Data::new("name", TokenKind::Symbol),
            data: Scalar::Text("Sxtanna".to_string()),
        };
        assert_eq!(korm.to_string(), "name:\"Sxtanna\"");
    }

    #[test]
    fn test_element_from_json_value() {
        let json = serde_json::json!({"a": [1, 2], "b": null});
        let element: Element = serde_json::from_value(json).unwrap();
        let entries = element.as_hash().unwrap();
        assert_eq!(entries[0].key().raw, "a");
        assert!(entries[1].as_scalar() == Some(&Scalar::Null));
    }

    #[test]
    fn test_element_to_json_value() {
        let document = Document::parse("{ 1: \"x\" flag: true }").unwrap();
        let json = serde_json::to_value(document.root()).unwrap();
        assert_eq!(json, serde_json::json!({"1": "x", "flag": true}));
    }
}
