//! Korm serialization.
//!
//! Writing happens in two steps. [`ElementSerializer`] maps any `Serialize`
//! value onto an [`Element`] tree, applying the registry's custom writers,
//! positional lists and comments. [`Writer`] then renders the tree as text
//! under a [`KormOptions`] layout.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use korm::{to_string, to_string_pretty};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let data = Data { x: 1, y: 2 };
//! assert_eq!(to_string(&data).unwrap(), "x:1 y:2");
//! assert_eq!(to_string_pretty(&data).unwrap(), "x: 1\ny: 2");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use korm::{KormOptions, Serializer};
//! use serde::Serialize;
//!
//! let mut serializer = Serializer::new(KormOptions::none());
//! vec![1, 2, 3, 4, 5].serialize(&mut serializer).unwrap();
//! assert_eq!(serializer.into_inner(), "[1, 2, 3, 4, 5]");
//! ```
//!
//! A record at the root of a document is written as its bare entries, without
//! the enclosing braces. Maps at the root keep their braces.

use crate::lexer::is_symbol_char;
use crate::options::KormOptions;
use crate::registry::Registry;
use crate::token::{Data, TokenKind};
use crate::value::{Element, KormType, Scalar, COMPLEX_TOKEN};
use crate::{Error, Result};
use log::{debug, trace};
use num_bigint::BigInt;
use serde::ser::Serializer as _;
use serde::{ser, Serialize};
use std::cell::RefCell;

/// The state a custom writer runs in.
///
/// Passed to writers registered with [`Korm::writer_for`](crate::Korm::writer_for).
/// Values converted through [`WriterContext::to_element`] go through the
/// same registry, so nested shapes keep their own custom writers.
pub struct WriterContext<'w> {
    pub(crate) registry: &'w Registry,
    pub(crate) options: KormOptions,
    codecs: bool,
    active: RefCell<Vec<&'static str>>,
}

impl<'w> WriterContext<'w> {
    pub(crate) fn new(registry: &'w Registry, options: KormOptions) -> Self {
        WriterContext {
            registry,
            options,
            codecs: true,
            active: RefCell::new(Vec::new()),
        }
    }

    /// A context that ignores custom writers, used to get at the structural
    /// form of a value.
    pub(crate) fn plain(registry: &'w Registry) -> Self {
        WriterContext {
            codecs: false,
            ..WriterContext::new(registry, KormOptions::none())
        }
    }

    #[must_use]
    pub fn options(&self) -> &KormOptions {
        &self.options
    }

    /// Maps `value` onto an element.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be written, such as a map with a
    /// `None` key.
    pub fn to_element<T: Serialize + ?Sized>(&self, value: &T) -> Result<Element> {
        value.serialize(ElementSerializer::new(self))
    }

    /// The context the contents of `name` are written in. A shape with a
    /// custom writer keeps its contents structural, since the writer reads
    /// them back into the value before it runs.
    fn inner(&self, name: &'static str) -> Option<WriterContext<'w>> {
        let applies = self.codecs
            && self.registry.writer(name).is_some()
            && !self.active.borrow().contains(&name);
        applies.then(|| WriterContext::plain(self.registry))
    }

    /// Passes the structural element of `name` through its custom writer.
    /// A writer already running for `name` is not entered again.
    fn push_custom(&self, name: &'static str, element: Element) -> Result<Element> {
        if !self.codecs {
            return Ok(element);
        }
        let writer = match self.registry.writer(name) {
            Some(writer) => writer,
            None => return Ok(element),
        };
        if self.active.borrow().contains(&name) {
            debug!("writer for {} is already active, writing structurally", name);
            return Ok(element);
        }

        trace!("custom writer for {}", name);
        self.active.borrow_mut().push(name);
        let result = writer(self, &element);
        self.active.borrow_mut().pop();
        result
    }
}

/// The Korm text serializer.
///
/// Created via [`Serializer::new`], or [`Serializer::with_registry`] to honor
/// custom writers.
pub struct Serializer<'r> {
    output: String,
    ctx: WriterContext<'r>,
}

impl Serializer<'static> {
    pub fn new(options: KormOptions) -> Self {
        Serializer::with_registry(options, Registry::empty())
    }
}

impl<'r> Serializer<'r> {
    pub fn with_registry(options: KormOptions, registry: &'r Registry) -> Self {
        Serializer {
            output: String::with_capacity(256),
            ctx: WriterContext::new(registry, options),
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn emit(&mut self, element: &Element, bare: bool) -> Result<()> {
        write_root(&mut self.output, &self.ctx.options, element, bare);
        Ok(())
    }
}

fn write_root(output: &mut String, options: &KormOptions, element: &Element, bare: bool) {
    let mut writer = Writer::new(options);
    writer.write_document(element, bare);
    output.push_str(&writer.finish());
}

macro_rules! serialize_root {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<()> {
            let element = ElementSerializer::new(&self.ctx).$method(v)?;
            self.emit(&element, false)
        }
    )*};
}

impl<'a, 'r> ser::Serializer for &'a mut Serializer<'r> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, SerializeVec<'a>>;
    type SerializeTuple = Compound<'a, SerializeVec<'a>>;
    type SerializeTupleStruct = Compound<'a, SerializeVec<'a>>;
    type SerializeTupleVariant = Compound<'a, SerializeVec<'a>>;
    type SerializeMap = Compound<'a, SerializeHash<'a>>;
    type SerializeStruct = Compound<'a, SerializeRecord<'a>>;
    type SerializeStructVariant = Compound<'a, SerializeRecord<'a>>;

    serialize_root! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    }

    fn serialize_none(self) -> Result<()> {
        self.emit(&Element::Scalar(Scalar::Null), false)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.emit(&Element::Scalar(Scalar::Null), false)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        let element = ElementSerializer::new(&self.ctx).serialize_unit_struct(name)?;
        self.emit(&element, true)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        let element = ElementSerializer::new(&self.ctx).serialize_unit_variant(
            name,
            variant_index,
            variant,
        )?;
        self.emit(&element, true)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        let element = ElementSerializer::new(&self.ctx).serialize_newtype_struct(name, value)?;
        self.emit(&element, true)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        let element = ElementSerializer::new(&self.ctx).serialize_newtype_variant(
            name,
            variant_index,
            variant,
            value,
        )?;
        self.emit(&element, true)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_seq(len)?;
        Ok(Compound::new(output, ctx, inner, false))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_tuple(len)?;
        Ok(Compound::new(output, ctx, inner, false))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_tuple_struct(name, len)?;
        Ok(Compound::new(output, ctx, inner, true))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_tuple_variant(
            name,
            variant_index,
            variant,
            len,
        )?;
        Ok(Compound::new(output, ctx, inner, true))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_map(len)?;
        Ok(Compound::new(output, ctx, inner, false))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_struct(name, len)?;
        Ok(Compound::new(output, ctx, inner, true))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let Serializer { output, ctx } = self;
        let ctx: &WriterContext<'_> = ctx;
        let inner = ElementSerializer::new(ctx).serialize_struct_variant(
            name,
            variant_index,
            variant,
            len,
        )?;
        Ok(Compound::new(output, ctx, inner, true))
    }
}

/// Collects a compound value as an element, then writes it as the document.
pub struct Compound<'a, C> {
    output: &'a mut String,
    ctx: &'a WriterContext<'a>,
    inner: C,
    bare: bool,
}

impl<'a, C> Compound<'a, C> {
    fn new(output: &'a mut String, ctx: &'a WriterContext<'a>, inner: C, bare: bool) -> Self {
        Compound {
            output,
            ctx,
            inner,
            bare,
        }
    }

    fn write(
        output: &mut String,
        ctx: &WriterContext<'_>,
        element: &Element,
        bare: bool,
    ) -> Result<()> {
        write_root(output, &ctx.options, element, bare);
        Ok(())
    }
}

impl<'a, C> ser::SerializeSeq for Compound<'a, C>
where
    C: ser::SerializeSeq<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.serialize_element(value)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

impl<'a, C> ser::SerializeTuple for Compound<'a, C>
where
    C: ser::SerializeTuple<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.serialize_element(value)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

impl<'a, C> ser::SerializeTupleStruct for Compound<'a, C>
where
    C: ser::SerializeTupleStruct<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.serialize_field(value)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

impl<'a, C> ser::SerializeTupleVariant for Compound<'a, C>
where
    C: ser::SerializeTupleVariant<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.serialize_field(value)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

impl<'a, C> ser::SerializeMap for Compound<'a, C>
where
    C: ser::SerializeMap<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.inner.serialize_key(key)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.serialize_value(value)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

impl<'a, C> ser::SerializeStruct for Compound<'a, C>
where
    C: ser::SerializeStruct<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.inner.serialize_field(key, value)
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

impl<'a, C> ser::SerializeStructVariant for Compound<'a, C>
where
    C: ser::SerializeStructVariant<Ok = Element, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.inner.serialize_field(key, value)
    }

    fn end(self) -> Result<()> {
        let Compound { output, ctx, inner, bare } = self;
        let element = inner.end()?;
        Self::write(output, ctx, &element, bare)
    }
}

/// Maps a `Serialize` value onto an [`Element`].
#[derive(Clone, Copy)]
pub struct ElementSerializer<'a> {
    ctx: &'a WriterContext<'a>,
}

impl<'a> ElementSerializer<'a> {
    pub fn new(ctx: &'a WriterContext<'a>) -> Self {
        ElementSerializer { ctx }
    }
}

fn integer<T>(value: T) -> Element
where
    i64: TryFrom<T>,
    BigInt: From<T>,
    T: Copy,
{
    match i64::try_from(value) {
        Ok(small) => Element::Scalar(Scalar::Int(small)),
        Err(_) => Element::Scalar(Scalar::BigInt(BigInt::from(value))),
    }
}

fn wrap_variant(variant: &'static str, element: Element) -> Element {
    Element::Korm(KormType::Hash {
        key: Data::none(),
        data: vec![element.into_korm(Data::new(variant, TokenKind::Symbol))],
    })
}

impl<'a> ser::Serializer for ElementSerializer<'a> {
    type Ok = Element;
    type Error = Error;

    type SerializeSeq = SerializeVec<'a>;
    type SerializeTuple = SerializeVec<'a>;
    type SerializeTupleStruct = SerializeVec<'a>;
    type SerializeTupleVariant = SerializeVec<'a>;
    type SerializeMap = SerializeHash<'a>;
    type SerializeStruct = SerializeRecord<'a>;
    type SerializeStructVariant = SerializeRecord<'a>;

    fn serialize_bool(self, v: bool) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_i16(self, v: i16) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_i32(self, v: i32) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_i64(self, v: i64) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Element> {
        Ok(integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_u16(self, v: u16) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_u32(self, v: u32) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Int(i64::from(v))))
    }

    fn serialize_u64(self, v: u64) -> Result<Element> {
        Ok(integer(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Element> {
        Ok(integer(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Dec(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Dec(v)))
    }

    fn serialize_char(self, v: char) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Char(v)))
    }

    fn serialize_str(self, v: &str) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Text(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Element> {
        let data = v
            .iter()
            .map(|&b| Element::Scalar(Scalar::Int(i64::from(b))))
            .collect();
        Ok(Element::Korm(KormType::List {
            key: Data::none(),
            data,
        }))
    }

    fn serialize_none(self) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Null))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Element> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Element> {
        Ok(Element::Scalar(Scalar::Null))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Element> {
        let element = Element::Korm(KormType::Hash {
            key: Data::none(),
            data: Vec::new(),
        });
        self.ctx.push_custom(name, element)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Element> {
        self.ctx
            .push_custom(name, Element::Scalar(Scalar::Symbol(variant.to_string())))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Element> {
        let ctx = self.ctx;
        if name == COMPLEX_TOKEN {
            return match value.serialize(self)? {
                Element::Scalar(Scalar::Text(raw)) => {
                    Ok(Element::Scalar(Scalar::Complex(raw)))
                }
                other => Ok(other),
            };
        }
        let element = match ctx.inner(name) {
            Some(inner) => value.serialize(ElementSerializer::new(&inner))?,
            None => value.serialize(self)?,
        };
        ctx.push_custom(name, element)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Element> {
        let ctx = self.ctx;
        let element = match ctx.inner(name) {
            Some(inner) => value.serialize(ElementSerializer::new(&inner))?,
            None => value.serialize(self)?,
        };
        ctx.push_custom(name, wrap_variant(variant, element))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.ctx, len.unwrap_or(0), None, None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.ctx, len, None, None))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.ctx, len, Some(name), None))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec<'a>> {
        Ok(SerializeVec::new(self.ctx, len, Some(name), Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeHash<'a>> {
        Ok(SerializeHash {
            ctx: self.ctx,
            data: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeRecord<'a>> {
        Ok(SerializeRecord::new(self.ctx, name, None, len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeRecord<'a>> {
        Ok(SerializeRecord::new(self.ctx, name, Some(variant), len))
    }
}

/// Sequences, tuples and tuple structs, collected as a list.
pub struct SerializeVec<'a> {
    ctx: &'a WriterContext<'a>,
    inner: Option<WriterContext<'a>>,
    data: Vec<Element>,
    name: Option<&'static str>,
    variant: Option<&'static str>,
}

impl<'a> SerializeVec<'a> {
    fn new(
        ctx: &'a WriterContext<'a>,
        len: usize,
        name: Option<&'static str>,
        variant: Option<&'static str>,
    ) -> Self {
        SerializeVec {
            ctx,
            inner: name.and_then(|name| ctx.inner(name)),
            data: Vec::with_capacity(len),
            name,
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let ctx = self.inner.as_ref().unwrap_or(self.ctx);
        self.data.push(value.serialize(ElementSerializer::new(ctx))?);
        Ok(())
    }

    fn finish(self) -> Result<Element> {
        let list = Element::Korm(KormType::List {
            key: Data::none(),
            data: self.data,
        });
        let element = match self.variant {
            Some(variant) => wrap_variant(variant, list),
            None => list,
        };
        match self.name {
            Some(name) => self.ctx.push_custom(name, element),
            None => Ok(element),
        }
    }
}

impl<'a> ser::SerializeSeq for SerializeVec<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Element> {
        self.finish()
    }
}

impl<'a> ser::SerializeTuple for SerializeVec<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Element> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleStruct for SerializeVec<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Element> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleVariant for SerializeVec<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Element> {
        self.finish()
    }
}

/// Maps, collected as a hash keyed by the converted map keys.
pub struct SerializeHash<'a> {
    ctx: &'a WriterContext<'a>,
    data: Vec<KormType>,
    next_key: Option<Data>,
}

impl<'a> ser::SerializeMap for SerializeHash<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        let element = key.serialize(ElementSerializer::new(self.ctx))?;
        self.next_key = Some(key_data(&element, &self.ctx.options)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("map value without a key"))?;
        let element = value.serialize(ElementSerializer::new(self.ctx))?;
        if element.is_null() && !self.ctx.options.serialize_nulls {
            return Ok(());
        }
        self.data.push(element.into_korm(key));
        Ok(())
    }

    fn end(self) -> Result<Element> {
        Ok(Element::Korm(KormType::Hash {
            key: Data::none(),
            data: self.data,
        }))
    }
}

/// Structs and struct variants. Fields are kept in declaration order until
/// the end, where the record becomes a hash or a positional list.
pub struct SerializeRecord<'a> {
    ctx: &'a WriterContext<'a>,
    inner: Option<WriterContext<'a>>,
    name: &'static str,
    variant: Option<&'static str>,
    fields: Vec<(&'static str, Element)>,
}

impl<'a> SerializeRecord<'a> {
    fn new(
        ctx: &'a WriterContext<'a>,
        name: &'static str,
        variant: Option<&'static str>,
        len: usize,
    ) -> Self {
        SerializeRecord {
            ctx,
            inner: ctx.inner(name),
            name,
            variant,
            fields: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, field: &'static str, value: &T) -> Result<()> {
        let ctx = self.inner.as_ref().unwrap_or(self.ctx);
        let element = value.serialize(ElementSerializer::new(ctx))?;
        self.fields.push((field, element));
        Ok(())
    }

    fn positional(self, order: &[String]) -> Element {
        let data = if order.is_empty() {
            self.fields.into_iter().map(|(_, element)| element).collect()
        } else {
            order
                .iter()
                .map(|slot| {
                    self.fields
                        .iter()
                        .find(|(field, _)| *field == slot.as_str())
                        .map_or(Element::Scalar(Scalar::Null), |(_, element)| {
                            element.clone()
                        })
                })
                .collect()
        };
        Element::Korm(KormType::List {
            key: Data::none(),
            data,
        })
    }

    fn hash(self) -> Element {
        let ctx = self.ctx;
        let options = &ctx.options;
        let registry = ctx.registry;
        let mut data: Vec<KormType> = Vec::with_capacity(self.fields.len());

        for (field, element) in self.fields {
            if element.is_null() && !options.serialize_nulls {
                continue;
            }
            let mut key = Data::new(field, TokenKind::Symbol);
            if options.include_comments {
                key.comments = registry.field_comments(self.name, field).to_vec();
            }
            data.push(element.into_korm(key));
        }

        if options.include_comments {
            if let Some(first) = data.first_mut() {
                let mut comments = registry.comments(self.name).to_vec();
                comments.append(&mut first.key_mut().comments);
                first.key_mut().comments = comments;
            }
        }

        Element::Korm(KormType::Hash {
            key: Data::none(),
            data,
        })
    }

    fn finish(self) -> Result<Element> {
        let ctx = self.ctx;
        let name = self.name;
        let element = match self.variant {
            Some(variant) => wrap_variant(variant, self.hash()),
            None => match ctx.registry.positional(name) {
                Some(order) => self.positional(order),
                None => self.hash(),
            },
        };
        ctx.push_custom(name, element)
    }
}

impl<'a> ser::SerializeStruct for SerializeRecord<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push(key, value)
    }

    fn end(self) -> Result<Element> {
        self.finish()
    }
}

impl<'a> ser::SerializeStructVariant for SerializeRecord<'a> {
    type Ok = Element;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push(key, value)
    }

    fn end(self) -> Result<Element> {
        self.finish()
    }
}

/// Converts a map key into key data.
///
/// Scalars keep their kind. Lists and hashes are rendered as text and become
/// complex keys, decoded again when read.
pub(crate) fn key_data(element: &Element, options: &KormOptions) -> Result<Data> {
    let data = match element {
        Element::Scalar(scalar) => match scalar {
            Scalar::Null => return Err(Error::unsupported_type("null as a map key")),
            Scalar::Bool(b) => Data::new(b.to_string(), TokenKind::Bool),
            Scalar::Int(i) => Data::new(i.to_string(), TokenKind::Int),
            Scalar::BigInt(i) => Data::new(i.to_string(), TokenKind::Int),
            Scalar::Dec(d) => Data::new(format_decimal(*d), TokenKind::Dec),
            Scalar::Char(c) => Data::new(c.to_string(), TokenKind::Char),
            Scalar::Text(s) => Data::new(s.as_str(), TokenKind::Text),
            Scalar::Symbol(s) => Data::new(s.as_str(), TokenKind::Symbol),
            Scalar::Complex(raw) => Data::new(raw.as_str(), TokenKind::Complex),
        },
        Element::Korm(korm) => {
            let mut writer = Writer::new(options);
            writer.naming += 1;
            writer.write_value(korm);
            Data::new(writer.finish(), TokenKind::Complex)
        }
    };
    Ok(data)
}

fn format_decimal(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            text + ".0"
        }
    }
}

/// Text that can be written without quotes and reads back as a symbol.
fn is_bare(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(is_symbol_char) && !matches!(text, "true" | "false" | "null")
}

/// Renders elements as Korm text.
pub(crate) struct Writer<'o> {
    output: String,
    options: &'o KormOptions,
    indent: usize,
    /// Depth of complex keys being rendered.
    naming: usize,
}

impl<'o> Writer<'o> {
    pub(crate) fn new(options: &'o KormOptions) -> Self {
        Writer {
            output: String::new(),
            options,
            indent: 0,
            naming: 0,
        }
    }

    pub(crate) fn finish(self) -> String {
        self.output
    }

    fn newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent {
            self.output.push(' ');
        }
    }

    fn separate(&mut self, on_new_line: bool) {
        if on_new_line {
            self.newline();
        } else {
            self.output.push(' ');
        }
    }

    /// Writes `element` as a whole document. With `bare`, a hash is written
    /// as its entries without braces.
    pub(crate) fn write_document(&mut self, element: &Element, bare: bool) {
        match element {
            Element::Scalar(Scalar::Null) => {}
            Element::Scalar(Scalar::Symbol(symbol)) => self.write_quoted(symbol, '"'),
            Element::Korm(KormType::Hash { data, .. }) if bare => self.write_entries(data),
            other => self.write_element(other),
        }
    }

    fn write_entries(&mut self, entries: &[KormType]) {
        let on_new_line = self.options.hash_entry_on_new_line;
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                if self.options.comma_after_hash_entry {
                    self.output.push(',');
                }
                self.separate(on_new_line);
            }
            self.write_comments(entry.key());
            self.write_entry(entry);
        }
        if on_new_line && self.options.trailing_commas && entries.len() > 1 {
            self.output.push(',');
        }
    }

    pub(crate) fn write_element(&mut self, element: &Element) {
        match element {
            Element::Scalar(scalar) => self.write_scalar(scalar),
            Element::Korm(korm) => self.write_value(korm),
        }
    }

    /// Writes `name:value`.
    pub(crate) fn write_entry(&mut self, entry: &KormType) {
        self.write_name(entry.key());
        self.output.push(':');
        if self.options.space_after_assign {
            self.output.push(' ');
        }
        self.write_value(entry);
    }

    fn write_value(&mut self, korm: &KormType) {
        match korm {
            KormType::Base { data, .. } => self.write_scalar(data),
            KormType::List { data, .. } => self.write_list(data),
            KormType::Hash { data, .. } => self.write_hash(data),
        }
    }

    fn write_comments(&mut self, key: &Data) {
        if !self.options.include_comments {
            return;
        }
        for line in key.comments.iter().flat_map(|comment| comment.split('\n')) {
            self.output.push_str("// ");
            self.output.push_str(line.trim_end_matches('\r'));
            self.newline();
        }
    }

    fn write_name(&mut self, key: &Data) {
        match key.kind {
            TokenKind::Text | TokenKind::Symbol if is_bare(&key.raw) => {
                self.output.push_str(&key.raw)
            }
            TokenKind::Text | TokenKind::Symbol => self.write_quoted(&key.raw, '"'),
            TokenKind::Char => self.write_quoted(&key.raw, '\''),
            TokenKind::Complex => self.write_complex(&key.raw),
            _ => self.output.push_str(&key.raw),
        }
    }

    fn write_hash(&mut self, entries: &[KormType]) {
        self.output.push('{');
        if entries.is_empty() {
            self.output.push_str(" }");
            return;
        }

        let on_new_line = if self.naming > 0 {
            self.options.complex_key_entry_on_new_line
        } else {
            self.options.hash_entry_on_new_line
        };

        self.indent += self.options.indent;
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && self.options.comma_after_hash_entry {
                self.output.push(',');
            }
            self.separate(on_new_line);
            self.write_comments(entry.key());
            self.write_entry(entry);
        }
        if on_new_line && self.options.trailing_commas && entries.len() > 1 {
            self.output.push(',');
        }
        self.indent -= self.options.indent;

        self.separate(on_new_line);
        self.output.push('}');
    }

    fn write_list(&mut self, elements: &[Element]) {
        self.output.push('[');
        if elements.is_empty() {
            self.output.push_str(" ]");
            return;
        }

        let on_new_line = self.options.list_entry_on_new_line
            || (self.options.complex_list_entry_on_new_line
                && elements.iter().any(Element::is_complex));

        if on_new_line {
            self.indent += self.options.indent;
            self.newline();
        }
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                self.output.push(',');
                self.separate(on_new_line);
            }
            self.write_element(element);
        }
        if on_new_line {
            if self.options.trailing_commas && elements.len() > 1 {
                self.output.push(',');
            }
            self.indent -= self.options.indent;
            self.newline();
        }
        self.output.push(']');
    }

    fn write_scalar(&mut self, scalar: &Scalar) {
        match scalar {
            Scalar::Null => self.output.push_str("null"),
            Scalar::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Scalar::Int(i) => self.output.push_str(&i.to_string()),
            Scalar::BigInt(i) => self.output.push_str(&i.to_string()),
            Scalar::Dec(d) => self.output.push_str(&format_decimal(*d)),
            Scalar::Char(c) => self.write_quoted(c.encode_utf8(&mut [0; 4]), '\''),
            Scalar::Text(s) => self.write_quoted(s, '"'),
            Scalar::Symbol(s) if is_bare(s) => self.output.push_str(s),
            Scalar::Symbol(s) => self.write_quoted(s, '"'),
            Scalar::Complex(raw) => self.write_complex(raw),
        }
    }

    fn write_quoted(&mut self, text: &str, delimiter: char) {
        self.output.push(delimiter);
        for ch in text.chars() {
            if ch == delimiter || ch == '\\' {
                self.output.push('\\');
            }
            self.output.push(ch);
        }
        self.output.push(delimiter);
    }

    /// Complex text is re-indented to the current depth. Newlines inside
    /// quoted literals are part of the value and are kept as they are.
    fn write_complex(&mut self, raw: &str) {
        self.output.push('`');
        let mut scan = Scan::Code;
        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            match scan {
                Scan::Code | Scan::LineComment if ch == '\n' => {
                    scan = Scan::Code;
                    self.newline();
                    continue;
                }
                Scan::Code => match ch {
                    '"' | '\'' => scan = Scan::Literal(ch),
                    '/' if chars.peek() == Some(&'/') => scan = Scan::LineComment,
                    '/' if chars.peek() == Some(&'*') => {
                        self.push_complex_char(ch);
                        chars.next();
                        self.push_complex_char('*');
                        scan = Scan::BlockComment;
                        continue;
                    }
                    _ => {}
                },
                Scan::Literal(delimiter) => {
                    if ch == '\\' {
                        self.push_complex_char(ch);
                        if let Some(next) = chars.next() {
                            self.push_complex_char(next);
                        }
                        continue;
                    }
                    if ch == delimiter {
                        scan = Scan::Code;
                    }
                }
                Scan::BlockComment if ch == '*' && chars.peek() == Some(&'/') => {
                    self.push_complex_char(ch);
                    chars.next();
                    self.push_complex_char('/');
                    scan = Scan::Code;
                    continue;
                }
                Scan::LineComment | Scan::BlockComment => {}
            }
            self.push_complex_char(ch);
        }
        self.output.push('`');
    }

    fn push_complex_char(&mut self, ch: char) {
        if matches!(ch, '`' | '\\') {
            self.output.push('\\');
        }
        self.output.push(ch);
    }
}

/// Where the complex writer is within the text it copies.
#[derive(Clone, Copy)]
enum Scan {
    Code,
    Literal(char),
    LineComment,
    BlockComment,
}
