//! Layout options for writing Korm text.
//!
//! [`KormOptions`] toggles independent formatting branches of the writer.
//! Every combination produces text that reads back to the same value.
//!
//! ## Examples
//!
//! ```rust
//! use korm::{to_string_with_options, KormOptions};
//! use std::collections::BTreeMap;
//!
//! let mut map = BTreeMap::new();
//! map.insert(1, "1");
//! map.insert(2, "2");
//!
//! let compact = to_string_with_options(&map, KormOptions::none()).unwrap();
//! assert_eq!(compact, "{ 1:\"1\" 2:\"2\" }");
//!
//! let spaced = KormOptions::none().with_space_after_assign(true);
//! assert_eq!(to_string_with_options(&map, spaced).unwrap(), "{ 1: \"1\" 2: \"2\" }");
//! ```

/// Writer layout configuration.
///
/// The default is the compact single-line layout of [`KormOptions::none`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KormOptions {
    /// Spaces added per nesting level.
    pub indent: usize,
    /// A comma after the last entry of a multi-line body.
    pub trailing_commas: bool,
    /// A space after the `:` of an entry.
    pub space_after_assign: bool,
    /// A comma between hash entries.
    pub comma_after_hash_entry: bool,
    /// Each hash entry on its own line.
    pub hash_entry_on_new_line: bool,
    /// Each hash entry on its own line inside a complex key.
    pub complex_key_entry_on_new_line: bool,
    /// Each list element on its own line.
    pub list_entry_on_new_line: bool,
    /// List elements on their own lines when any of them is a list or hash.
    pub complex_list_entry_on_new_line: bool,
    /// Registered comments written as `//` lines.
    pub include_comments: bool,
    /// Null entries written as `null` instead of being left out.
    pub serialize_nulls: bool,
}

impl Default for KormOptions {
    fn default() -> Self {
        KormOptions::none()
    }
}

impl KormOptions {
    /// Creates default options (compact, single line, 2-space indent).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::KormOptions;
    ///
    /// let options = KormOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(!options.hash_entry_on_new_line);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every formatting branch off.
    #[must_use]
    pub const fn none() -> Self {
        KormOptions {
            indent: 2,
            trailing_commas: false,
            space_after_assign: false,
            comma_after_hash_entry: false,
            hash_entry_on_new_line: false,
            complex_key_entry_on_new_line: false,
            list_entry_on_new_line: false,
            complex_list_entry_on_new_line: false,
            include_comments: false,
            serialize_nulls: false,
        }
    }

    /// Readable multi-line layout: spaced assignments, one hash entry per
    /// line, nested lists and hashes in a list on their own lines, comments.
    #[must_use]
    pub const fn min() -> Self {
        KormOptions {
            space_after_assign: true,
            hash_entry_on_new_line: true,
            complex_list_entry_on_new_line: true,
            include_comments: true,
            ..KormOptions::none()
        }
    }

    /// Every formatting branch on.
    #[must_use]
    pub const fn max() -> Self {
        KormOptions {
            indent: 2,
            trailing_commas: true,
            space_after_assign: true,
            comma_after_hash_entry: true,
            hash_entry_on_new_line: true,
            complex_key_entry_on_new_line: true,
            list_entry_on_new_line: true,
            complex_list_entry_on_new_line: true,
            include_comments: true,
            serialize_nulls: true,
        }
    }

    /// Alias for [`KormOptions::min`].
    #[must_use]
    pub const fn pretty() -> Self {
        KormOptions::min()
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::KormOptions;
    ///
    /// let options = KormOptions::pretty().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_trailing_commas(mut self, on: bool) -> Self {
        self.trailing_commas = on;
        self
    }

    #[must_use]
    pub fn with_space_after_assign(mut self, on: bool) -> Self {
        self.space_after_assign = on;
        self
    }

    #[must_use]
    pub fn with_comma_after_hash_entry(mut self, on: bool) -> Self {
        self.comma_after_hash_entry = on;
        self
    }

    #[must_use]
    pub fn with_hash_entry_on_new_line(mut self, on: bool) -> Self {
        self.hash_entry_on_new_line = on;
        self
    }

    #[must_use]
    pub fn with_complex_key_entry_on_new_line(mut self, on: bool) -> Self {
        self.complex_key_entry_on_new_line = on;
        self
    }

    #[must_use]
    pub fn with_list_entry_on_new_line(mut self, on: bool) -> Self {
        self.list_entry_on_new_line = on;
        self
    }

    #[must_use]
    pub fn with_complex_list_entry_on_new_line(mut self, on: bool) -> Self {
        self.complex_list_entry_on_new_line = on;
        self
    }

    #[must_use]
    pub fn with_include_comments(mut self, on: bool) -> Self {
        self.include_comments = on;
        self
    }

    /// Writes `None` fields and map values as `null` instead of dropping them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use korm::{to_string_with_options, KormOptions};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Entry { name: Option<String> }
    ///
    /// let entry = Entry { name: None };
    /// assert_eq!(to_string_with_options(&entry, KormOptions::none()).unwrap(), "");
    ///
    /// let options = KormOptions::none().with_serialize_nulls(true);
    /// assert_eq!(to_string_with_options(&entry, options).unwrap(), "name:null");
    /// ```
    #[must_use]
    pub fn with_serialize_nulls(mut self, on: bool) -> Self {
        self.serialize_nulls = on;
        self
    }
}
