//! Korm Text Format
//!
//! This module documents the Korm text format as read and written by this
//! library.
//!
//! # Overview
//!
//! A Korm document is a sequence of entries. An entry is either a bare value
//! or a key followed by `:` and a value. Values are scalars, lists or hashes,
//! and hashes are themselves sequences of keyed entries.
//!
//! ```text
//! document   := entry*
//! entry      := value | key ':' value
//! key        := SYMBOL | '`' document '`'
//! value      := scalar | list | hash
//! scalar     := INT | DEC | BOOL | CHAR_LIT | STRING_LIT | SYMBOL
//! list       := '[' (value (',' value)*)? ']'
//! hash       := '{' (entry (','? entry)*)? '}'
//! ```
//!
//! Whitespace and newlines separate tokens and are otherwise insignificant.
//! Commas between top-level entries and between hash entries are optional.
//!
//! # Scalars
//!
//! | Type | Syntax | Example |
//! |------|--------|---------|
//! | Null | `null` | `value: null` |
//! | Boolean | `true` or `false` | `active: true` |
//! | Integer | Digits, optional leading `-` | `count: -42` |
//! | Big integer | Digits beyond the `i64` range | `large: 99999999999999999999` |
//! | Decimal | Digits with a single `.` | `price: 19.99` |
//! | Character | `'c'` | `grade: 'A'` |
//! | Text | `"..."` | `name: "Alice"` |
//! | Symbol | Letters, digits, `_`, `-`, `.` | `day: MONDAY` |
//! | Complex | `` `...` `` | ``key: `{ x: 1 }` `` |
//!
//! A token that starts like a number but continues with other symbol
//! characters is a symbol: `1st`, `2024-01-15` and `1.2.3` are all symbols.
//! A lone `-` is a symbol.
//!
//! ## Escapes
//!
//! Inside a literal, a backslash followed by the literal's own delimiter or by
//! another backslash stands for that character. Any other backslash sequence
//! is kept as written:
//!
//! ```text
//! "Hello \"World\""   =>  Hello "World"
//! "C:\\temp"          =>  C:\temp
//! "line\n"            =>  line\n  (backslash and n, unchanged)
//! ```
//!
//! # Keys
//!
//! A key is any scalar token directly followed by `:`. Whatever kind the token
//! was lexed as, in key position it is read as a symbol, so `1: 'A'` is an
//! entry whose key text is `1`. Maps with integer keys read their keys back
//! from that text.
//!
//! Keys that are not valid bare symbols are written quoted:
//!
//! ```text
//! name: 1
//! "first name": 2
//! "true": 3
//! ```
//!
//! ## Complex Keys
//!
//! A key may be a whole document wrapped in backticks. Writers use this for
//! map keys that are lists or records:
//!
//! ```text
//! { `{ first:1 second:2 }`:21 }
//! { `[1, 2]`:"pair" }
//! ```
//!
//! A backtick inside a complex literal is escaped with a backslash.
//!
//! # Lists
//!
//! ```text
//! [1, 2, 3]
//! ["a", 'b', c]
//! [[1, 2], { x: 1 }]
//! [ ]
//! ```
//!
//! Elements are separated by commas. A list element carries no key.
//!
//! # Hashes
//!
//! ```text
//! { name: "Emiliee" age: 21 }
//! { name: "Emiliee", age: 21 }
//! {
//!   name: "Emiliee"
//!   age: 21
//! }
//! { }
//! ```
//!
//! # Comments
//!
//! `//` comments run to the end of the line, `/* */` comments may span lines.
//! Both are discarded when reading. A `/` that starts neither is an error.
//!
//! ```text
//! // the service port
//! port: 8080 /* default */
//! ```
//!
//! # Documents and Rust Types
//!
//! | Rust | Korm |
//! |------|------|
//! | `bool` | `true` |
//! | integers | `42`, wrapping to the requested width when read |
//! | `f32`, `f64` | `1.5`, `NaN`, `inf`, `-inf` |
//! | `char` | `'c'` |
//! | `String`, `&str` | `"text"` |
//! | `Option<T>` | the value, or `null` for `None` |
//! | `()` | `null` |
//! | unit structs | `{ }` |
//! | `Vec<T>`, arrays, tuples, sets | `[a, b]` |
//! | maps | `{ key: value }` |
//! | structs | `{ field: value }`, or a bare field list at the top level |
//! | unit variants | `VARIANT` |
//! | data variants | `{ Variant: data }` |
//!
//! A top-level record is written without braces. Reading accepts either
//! form, and entries may appear in any order:
//!
//! ```text
//! name: "Sxtanna" date: MONDAY
//! { date: MONDAY name: "Sxtanna" }
//! ```
//!
//! Two-element tuples also read from a hash with `first`/`second` or
//! `key`/`value` entries.
//!
//! # Edge Cases
//!
//! ## Empty Documents
//!
//! An empty document reads as `None`, `()`, or a struct whose fields all have
//! defaults.
//!
//! ## Unknown and Missing Entries
//!
//! Entries that match no field are ignored. A missing field is an error
//! unless the field is an `Option` or carries `#[serde(default)]`.
//!
//! ## Numbers
//!
//! ```text
//! 256768845 read as i8   =>  77
//! 256768845 read as i16  =>  -1203
//! 3.9 read as u8         =>  3
//! ```
//!
//! # Limitations
//!
//! - Text is read fully into memory; there is no streaming reader.
//! - There is no binary form.
