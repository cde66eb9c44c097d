//! Per-shape configuration consumed by both mapping directions.
//!
//! Serde's derives describe how a type is built and taken apart. The
//! [`Registry`] adds what a derive cannot: custom readers and writers that
//! replace the structural mapping of a shape, the positional-list convention,
//! and comments written next to a shape's fields.
//!
//! Shapes are identified by their serde container name, which is the type's
//! identifier unless renamed with `#[serde(rename = "...")]`. Enums are
//! identified by the enum name, for every variant.

use crate::de::ReaderContext;
use crate::ser::WriterContext;
use crate::value::{Element, KormType};
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A custom reader: builds the element a shape is mapped from out of the
/// entries found where the shape was requested.
pub type ReadFn = Arc<dyn Fn(&ReaderContext<'_>, &[KormType]) -> Result<Element> + Send + Sync>;

/// A custom writer: replaces the structural element of a shape.
pub type WriteFn = Arc<dyn Fn(&WriterContext<'_>, &Element) -> Result<Element> + Send + Sync>;

/// Lookup table of custom codecs, positional lists and comments by shape name.
#[derive(Clone, Default)]
pub struct Registry {
    readers: HashMap<String, ReadFn>,
    writers: HashMap<String, WriteFn>,
    positional: HashMap<String, Vec<String>>,
    comments: HashMap<String, Vec<String>>,
    field_comments: HashMap<(String, String), Vec<String>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_reader(&mut self, name: &str, reader: ReadFn) {
        self.readers.insert(name.to_string(), reader);
    }

    pub fn insert_writer(&mut self, name: &str, writer: WriteFn) {
        self.writers.insert(name.to_string(), writer);
    }

    /// Declares that `name` is written as a list of its fields. An empty
    /// `order` keeps the declaration order of the fields.
    pub fn insert_positional(&mut self, name: &str, order: &[&str]) {
        self.positional.insert(
            name.to_string(),
            order.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn insert_comment(&mut self, name: &str, lines: &[&str]) {
        self.comments
            .entry(name.to_string())
            .or_default()
            .extend(lines.iter().map(|s| s.to_string()));
    }

    pub fn insert_field_comment(&mut self, name: &str, field: &str, lines: &[&str]) {
        self.field_comments
            .entry((name.to_string(), field.to_string()))
            .or_default()
            .extend(lines.iter().map(|s| s.to_string()));
    }

    #[must_use]
    pub fn reader(&self, name: &str) -> Option<&ReadFn> {
        self.readers.get(name)
    }

    #[must_use]
    pub fn writer(&self, name: &str) -> Option<&WriteFn> {
        self.writers.get(name)
    }

    #[must_use]
    pub fn positional(&self, name: &str) -> Option<&[String]> {
        self.positional.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn comments(&self, name: &str) -> &[String] {
        self.comments.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn field_comments(&self, name: &str, field: &str) -> &[String] {
        self.field_comments
            .get(&(name.to_string(), field.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// The registry used when no [`Korm`](crate::Korm) is involved.
    pub(crate) fn empty() -> &'static Registry {
        static EMPTY: OnceLock<Registry> = OnceLock::new();
        EMPTY.get_or_init(Registry::default)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("readers", &self.readers.keys().collect::<Vec<_>>())
            .field("writers", &self.writers.keys().collect::<Vec<_>>())
            .field("positional", &self.positional)
            .field("comments", &self.comments)
            .field("field_comments", &self.field_comments)
            .finish()
    }
}

/// The serde container name of `T` as derived by default: the last path
/// segment of the type name, without generic arguments.
///
/// # Examples
///
/// ```rust
/// use korm::shape_name;
///
/// struct Machine;
/// struct Wrapper<T>(T);
///
/// assert_eq!(shape_name::<Machine>(), "Machine");
/// assert_eq!(shape_name::<Wrapper<u8>>(), "Wrapper");
/// ```
#[must_use]
pub fn shape_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_accumulate() {
        let mut registry = Registry::new();
        registry.insert_comment("Config", &["first"]);
        registry.insert_comment("Config", &["second"]);
        registry.insert_field_comment("Config", "port", &["tcp port"]);

        assert_eq!(registry.comments("Config"), ["first", "second"]);
        assert_eq!(registry.field_comments("Config", "port"), ["tcp port"]);
        assert!(registry.field_comments("Config", "host").is_empty());
        assert!(registry.comments("Other").is_empty());
    }

    #[test]
    fn test_positional_order() {
        let mut registry = Registry::new();
        registry.insert_positional("AsListType", &[]);
        registry.insert_positional("Reordered", &["date", "name"]);

        assert_eq!(registry.positional("AsListType"), Some(&[][..]));
        assert_eq!(
            registry.positional("Reordered"),
            Some(&["date".to_string(), "name".to_string()][..])
        );
        assert_eq!(registry.positional("Missing"), None);
    }

    #[test]
    fn test_shape_name_of_nested_module() {
        mod inner {
            pub struct Holder;
        }
        assert_eq!(shape_name::<inner::Holder>(), "Holder");
        assert_eq!(shape_name::<Vec<inner::Holder>>(), "Vec");
    }
}
