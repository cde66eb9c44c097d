//! The configurable Korm engine.
//!
//! [`Korm`] bundles a [`Registry`] of per-shape customizations with the
//! [`KormOptions`] used for writing. The free functions of the crate root are
//! the same operations with an empty registry.
//!
//! ## Examples
//!
//! ```rust
//! use korm::{Korm, KormOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Account {
//!     name: String,
//!     balance: i64,
//! }
//!
//! let mut korm = Korm::with_options(KormOptions::none());
//! korm.as_list::<Account>(&[]);
//!
//! let account = Account { name: "Sxtanna".to_string(), balance: 12 };
//! let text = korm.push(&account).unwrap();
//! assert_eq!(text, "[\"Sxtanna\", 12]");
//! assert_eq!(korm.pull::<Account>(&text).unwrap(), account);
//! ```

use crate::de::ReaderContext;
use crate::registry::{shape_name, ReadFn, Registry, WriteFn};
use crate::ser::{Serializer, WriterContext};
use crate::value::{Document, Element, KormType};
use crate::{Error, KormOptions, Result};
use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;
use std::io;
use std::sync::Arc;

/// A reader and writer with custom codecs, positional lists and comments.
///
/// Registration methods return `&mut Self` so they can be chained. A
/// configured engine is immutable while it reads and writes, so a shared
/// reference can be used from several threads at once.
#[derive(Clone, Debug, Default)]
pub struct Korm {
    registry: Registry,
    options: KormOptions,
}

impl Korm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: KormOptions) -> Self {
        Korm {
            registry: Registry::new(),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &KormOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: KormOptions) -> &mut Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parses `text` and maps it onto `T`.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`Error::Lex`] or [`Error::Syntax`] for malformed text,
    /// a mapping error if the document does not fit `T`, and [`Error::Absent`]
    /// if a custom reader produced nothing.
    #[must_use = "this returns the result of the operation, errors must be handled"]
    pub fn pull<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let document = Document::parse(text)?;
        self.extract(&document)
    }

    /// Reads all of `reader` and maps it onto `T`.
    #[must_use = "this returns the result of the operation, errors must be handled"]
    pub fn pull_reader<R: io::Read, T: DeserializeOwned>(&self, mut reader: R) -> Result<T> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::io(&e.to_string()))?;
        self.pull(&text)
    }

    /// Maps an already parsed document onto `T`.
    pub fn extract<T: DeserializeOwned>(&self, document: &Document) -> Result<T> {
        crate::de::extract(document, &self.registry)
    }

    /// Maps a document onto `T`, turning any failure into `None`.
    #[must_use]
    pub fn extract_as<T: DeserializeOwned>(&self, document: &Document) -> Option<T> {
        self.extract(document)
            .map_err(|e| debug!("extraction absorbed: {}", e))
            .ok()
    }

    pub fn extract_list<T: DeserializeOwned>(&self, document: &Document) -> Result<Vec<T>> {
        self.extract(document)
    }

    /// Maps a document onto a map in document order.
    pub fn extract_map<K, V>(&self, document: &Document) -> Result<IndexMap<K, V>>
    where
        K: DeserializeOwned + Hash + Eq,
        V: DeserializeOwned,
    {
        self.extract(document)
    }

    /// Writes `value` as a document.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be written or a custom writer
    /// fails.
    #[must_use = "this returns the result of the operation, errors must be handled"]
    pub fn push<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let mut serializer = Serializer::with_registry(self.options.clone(), &self.registry);
        value.serialize(&mut serializer)?;
        Ok(serializer.into_inner())
    }

    /// Writes `value` as a document to an `io::Write`.
    #[must_use = "this returns the result of the operation, errors must be handled"]
    pub fn push_to_writer<W: io::Write, T: Serialize + ?Sized>(
        &self,
        mut writer: W,
        value: &T,
    ) -> Result<()> {
        let text = self.push(value)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| Error::io(&e.to_string()))
    }

    /// Maps `value` onto an element, applying custom writers.
    pub fn to_element<T: Serialize + ?Sized>(&self, value: &T) -> Result<Element> {
        WriterContext::new(&self.registry, self.options.clone()).to_element(value)
    }

    /// Registers a custom reader for `T`.
    ///
    /// Wherever `T` is read, `reader` receives the entries found there: the
    /// entries of a hash, or any other node as a single unnamed entry. The
    /// value it returns stands for `T`; `None` fails with [`Error::Absent`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::{Korm, KormType};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize, Deserialize, Debug, PartialEq)]
    /// struct Celsius(f64);
    ///
    /// let mut korm = Korm::new();
    /// korm.reader_for(|_, entries: &[KormType]| {
    ///     let fahrenheit: f64 = entries.first()?.as_scalar()?.as_str()?.parse().ok()?;
    ///     Some(Celsius((fahrenheit - 32.0) * 5.0 / 9.0))
    /// });
    ///
    /// assert_eq!(korm.pull::<Celsius>("\"212\"").unwrap(), Celsius(100.0));
    /// ```
    pub fn reader_for<T, F>(&mut self, reader: F) -> &mut Self
    where
        T: Serialize + 'static,
        F: Fn(&ReaderContext<'_>, &[KormType]) -> Option<T> + Send + Sync + 'static,
    {
        self.reader_named(shape_name::<T>(), reader)
    }

    /// Registers a custom reader under an explicit shape name, for types
    /// renamed with `#[serde(rename)]`.
    pub fn reader_named<T, F>(&mut self, name: &str, reader: F) -> &mut Self
    where
        T: Serialize + 'static,
        F: Fn(&ReaderContext<'_>, &[KormType]) -> Option<T> + Send + Sync + 'static,
    {
        let codec: ReadFn = Arc::new(
            move |ctx: &ReaderContext<'_>, entries: &[KormType]| -> Result<Element> {
                let value = reader(ctx, entries).ok_or(Error::Absent)?;
                WriterContext::plain(ctx.registry).to_element(&value)
            },
        );
        debug!("registered reader for {}", name);
        self.registry.insert_reader(name, codec);
        self
    }

    /// Registers a custom writer for `T`. `writer` receives the value and
    /// returns the element written in its place.
    pub fn writer_for<T, F>(&mut self, writer: F) -> &mut Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&WriterContext<'_>, &T) -> Result<Element> + Send + Sync + 'static,
    {
        self.writer_named(shape_name::<T>(), writer)
    }

    pub fn writer_named<T, F>(&mut self, name: &str, writer: F) -> &mut Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&WriterContext<'_>, &T) -> Result<Element> + Send + Sync + 'static,
    {
        let codec: WriteFn = Arc::new(
            move |ctx: &WriterContext<'_>, element: &Element| -> Result<Element> {
                let value: T = crate::de::from_element_plain(element, ctx.registry)?;
                writer(ctx, &value)
            },
        );
        debug!("registered writer for {}", name);
        self.registry.insert_writer(name, codec);
        self
    }

    /// Registers a reader and a writer for `T` at once.
    pub fn codec_for<T, R, W>(&mut self, reader: R, writer: W) -> &mut Self
    where
        T: Serialize + DeserializeOwned + 'static,
        R: Fn(&ReaderContext<'_>, &[KormType]) -> Option<T> + Send + Sync + 'static,
        W: Fn(&WriterContext<'_>, &T) -> Result<Element> + Send + Sync + 'static,
    {
        self.reader_for(reader).writer_for(writer)
    }

    /// Writes `T` as a list of its field values and reads it back from one.
    /// An empty `order` uses the field declaration order.
    pub fn as_list<T: ?Sized>(&mut self, order: &[&str]) -> &mut Self {
        self.as_list_named(shape_name::<T>(), order)
    }

    pub fn as_list_named(&mut self, name: &str, order: &[&str]) -> &mut Self {
        self.registry.insert_positional(name, order);
        self
    }

    /// Comment lines written before the first field of `T`.
    pub fn comment<T: ?Sized>(&mut self, lines: &[&str]) -> &mut Self {
        self.registry.insert_comment(shape_name::<T>(), lines);
        self
    }

    /// Comment lines written before one field of `T`.
    pub fn comment_field<T: ?Sized>(&mut self, field: &str, lines: &[&str]) -> &mut Self {
        self.registry
            .insert_field_comment(shape_name::<T>(), field, lines);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Lang {
        code: String,
    }

    #[test]
    fn test_absent_reader_result() {
        let mut korm = Korm::new();
        korm.reader_for(|_, _: &[KormType]| None::<Lang>);
        assert!(matches!(korm.pull::<Lang>("code: \"en\""), Err(Error::Absent)));
        assert_eq!(korm.extract_as::<Lang>(&Document::parse("code: \"en\"").unwrap()), None);
    }

    #[test]
    fn test_writer_receives_value() {
        let mut korm = Korm::with_options(KormOptions::none());
        korm.writer_for(|_, lang: &Lang| {
            Ok(Element::Scalar(Scalar::Text(lang.code.to_uppercase())))
        });
        let text = korm.push(&vec![Lang { code: "en".to_string() }]).unwrap();
        assert_eq!(text, "[\"EN\"]");
    }

    #[test]
    fn test_push_to_writer() {
        let korm = Korm::new();
        let mut buffer = Vec::new();
        korm.push_to_writer(&mut buffer, &Lang { code: "en".to_string() })
            .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "code:\"en\"");
    }

    #[test]
    fn test_pull_reader() {
        let korm = Korm::new();
        let lang: Lang = korm.pull_reader("code: \"de\"".as_bytes()).unwrap();
        assert_eq!(lang.code, "de");
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Korm>();
    }
}
