//! Typed intermediate tree for configuration structures.
//!
//! A configuration object is serialized into a [`ConfigTree`] whose leaves
//! keep the exact scalar width of the originating field. Overrides patch the
//! tree and the tree itself deserializes back into the typed object, so every
//! leaf (non-finite floats included) crosses the merge unchanged.

use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{self, DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde::ser::{self, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Path separator for dotted leaf paths.
pub const PATH_SEPARATOR: char = '.';

/// Failures building or merging a [`ConfigTree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Message produced by a `Serialize` implementation.
    #[error("{0}")]
    Custom(String),
    /// The value has no representation in the tree.
    #[error("{0} values are not supported in configuration")]
    Unsupported(&'static str),
    /// A map key could not be turned into a path segment.
    #[error("map keys must be strings or integers, found {0}")]
    InvalidKey(&'static str),
    /// The configuration did not serialize to a table.
    #[error("configuration must serialize to a table, found {0}")]
    NonTableRoot(&'static str),
    /// The patched tree no longer fits the typed configuration.
    #[error("{0}")]
    Mismatch(String),
}

impl ser::Error for TreeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl de::Error for TreeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Mismatch(msg.to_string())
    }
}

/// Scalar leaf value tagged with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `bool`.
    Bool(bool),
    /// `i8`.
    I8(i8),
    /// `i16`.
    I16(i16),
    /// `i32`.
    I32(i32),
    /// `i64` (and `isize`).
    I64(i64),
    /// `u8`.
    U8(u8),
    /// `u16`.
    U16(u16),
    /// `u32`.
    U32(u32),
    /// `u64` (and `usize`).
    U64(u64),
    /// `f32`.
    F32(f32),
    /// `f64`.
    F64(f64),
    /// Strings, chars and unit enum variants.
    Str(String),
}

impl Scalar {
    /// Name of the declared type, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
        }
    }

    /// True when both scalars carry the same type tag.
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn into_key(self) -> Result<String, TreeError> {
        match self {
            Self::Str(value) => Ok(value),
            Self::I8(value) => Ok(value.to_string()),
            Self::I16(value) => Ok(value.to_string()),
            Self::I32(value) => Ok(value.to_string()),
            Self::I64(value) => Ok(value.to_string()),
            Self::U8(value) => Ok(value.to_string()),
            Self::U16(value) => Ok(value.to_string()),
            Self::U32(value) => Ok(value.to_string()),
            Self::U64(value) => Ok(value.to_string()),
            other => Err(TreeError::InvalidKey(other.type_name())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::I8(value) => write!(formatter, "{value}"),
            Self::I16(value) => write!(formatter, "{value}"),
            Self::I32(value) => write!(formatter, "{value}"),
            Self::I64(value) => write!(formatter, "{value}"),
            Self::U8(value) => write!(formatter, "{value}"),
            Self::U16(value) => write!(formatter, "{value}"),
            Self::U32(value) => write!(formatter, "{value}"),
            Self::U64(value) => write!(formatter, "{value}"),
            Self::F32(value) => write!(formatter, "{value}"),
            Self::F64(value) => write!(formatter, "{value}"),
            Self::Str(value) => formatter.write_str(value),
        }
    }
}

/// Generic configuration tree mirroring the typed structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigTree {
    /// Struct or map; keys are field names (after serde renames).
    Table(BTreeMap<String, ConfigTree>),
    /// Sequence leaf.
    List(Vec<ConfigTree>),
    /// Scalar leaf.
    Scalar(Scalar),
}

impl ConfigTree {
    /// Serialize a typed configuration object into a tree.
    pub fn from_config<T>(config: &T) -> Result<Self, TreeError>
    where
        T: Serialize + ?Sized,
    {
        match config.serialize(TreeSerializer)? {
            Some(tree @ Self::Table(_)) => Ok(tree),
            Some(other) => Err(TreeError::NonTableRoot(other.type_name())),
            None => Err(TreeError::NonTableRoot("nothing")),
        }
    }

    /// Deserialize the tree back into a typed configuration object.
    pub fn into_config<T: DeserializeOwned>(self) -> Result<T, TreeError> {
        T::deserialize(self)
    }

    /// Name of the node kind, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::List(_) => "list",
            Self::Scalar(scalar) => scalar.type_name(),
        }
    }

    /// Node at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Self> {
        path.split(PATH_SEPARATOR)
            .try_fold(self, |node, segment| match node {
                Self::Table(entries) => entries.get(segment),
                _ => None,
            })
    }

    /// Replace the node at an existing dotted path.
    ///
    /// Returns `false` (and changes nothing) when the path does not exist.
    pub fn set(&mut self, path: &str, value: Self) -> bool {
        let mut node = self;
        for segment in path.split(PATH_SEPARATOR) {
            let Self::Table(entries) = node else {
                return false;
            };
            let Some(child) = entries.get_mut(segment) else {
                return false;
            };
            node = child;
        }
        *node = value;
        true
    }
}

impl From<Scalar> for ConfigTree {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

/// Join a parent path and a child segment.
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_owned()
    } else {
        format!("{parent}{PATH_SEPARATOR}{segment}")
    }
}

fn single_entry(key: &'static str, value: ConfigTree) -> ConfigTree {
    ConfigTree::Table(BTreeMap::from([(key.to_owned(), value)]))
}

// `None` output means "omit": optional fields that are unset disappear from
// the tree and come back as `None` at merge time.
struct TreeSerializer;

type Built = Option<ConfigTree>;

fn scalar(value: Scalar) -> Result<Built, TreeError> {
    Ok(Some(ConfigTree::Scalar(value)))
}

impl ser::Serializer for TreeSerializer {
    type Ok = Built;
    type Error = TreeError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = TableBuilder;
    type SerializeStruct = TableBuilder;
    type SerializeStructVariant = VariantTableBuilder;

    fn serialize_bool(self, value: bool) -> Result<Built, TreeError> {
        scalar(Scalar::Bool(value))
    }

    fn serialize_i8(self, value: i8) -> Result<Built, TreeError> {
        scalar(Scalar::I8(value))
    }

    fn serialize_i16(self, value: i16) -> Result<Built, TreeError> {
        scalar(Scalar::I16(value))
    }

    fn serialize_i32(self, value: i32) -> Result<Built, TreeError> {
        scalar(Scalar::I32(value))
    }

    fn serialize_i64(self, value: i64) -> Result<Built, TreeError> {
        scalar(Scalar::I64(value))
    }

    fn serialize_u8(self, value: u8) -> Result<Built, TreeError> {
        scalar(Scalar::U8(value))
    }

    fn serialize_u16(self, value: u16) -> Result<Built, TreeError> {
        scalar(Scalar::U16(value))
    }

    fn serialize_u32(self, value: u32) -> Result<Built, TreeError> {
        scalar(Scalar::U32(value))
    }

    fn serialize_u64(self, value: u64) -> Result<Built, TreeError> {
        scalar(Scalar::U64(value))
    }

    fn serialize_f32(self, value: f32) -> Result<Built, TreeError> {
        scalar(Scalar::F32(value))
    }

    fn serialize_f64(self, value: f64) -> Result<Built, TreeError> {
        scalar(Scalar::F64(value))
    }

    fn serialize_char(self, value: char) -> Result<Built, TreeError> {
        scalar(Scalar::Str(value.to_string()))
    }

    fn serialize_str(self, value: &str) -> Result<Built, TreeError> {
        scalar(Scalar::Str(value.to_owned()))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Built, TreeError> {
        let items = value
            .iter()
            .map(|byte| ConfigTree::Scalar(Scalar::U8(*byte)))
            .collect();
        Ok(Some(ConfigTree::List(items)))
    }

    fn serialize_none(self) -> Result<Built, TreeError> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Built, TreeError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Built, TreeError> {
        Err(TreeError::Unsupported("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Built, TreeError> {
        Err(TreeError::Unsupported("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Built, TreeError> {
        scalar(Scalar::Str(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Built, TreeError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Built, TreeError>
    where
        T: ?Sized + Serialize,
    {
        Ok(value
            .serialize(TreeSerializer)?
            .map(|inner| single_entry(variant, inner)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, TreeError> {
        Ok(SeqBuilder::with_capacity(len.unwrap_or_default()))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, TreeError> {
        Ok(SeqBuilder::with_capacity(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, TreeError> {
        Ok(SeqBuilder::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, TreeError> {
        Ok(VariantSeqBuilder {
            variant,
            seq: SeqBuilder::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<TableBuilder, TreeError> {
        Ok(TableBuilder::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<TableBuilder, TreeError> {
        Ok(TableBuilder::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantTableBuilder, TreeError> {
        Ok(VariantTableBuilder {
            variant,
            table: TableBuilder::default(),
        })
    }
}

struct SeqBuilder {
    items: Vec<ConfigTree>,
}

impl SeqBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        let item = value
            .serialize(TreeSerializer)?
            .ok_or(TreeError::Unsupported("null sequence element"))?;
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> ConfigTree {
        ConfigTree::List(self.items)
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(self.finish()))
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    seq: SeqBuilder,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        self.seq.push(value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(single_entry(self.variant, self.seq.finish())))
    }
}

#[derive(Default)]
struct TableBuilder {
    entries: BTreeMap<String, ConfigTree>,
    pending_key: Option<String>,
}

impl TableBuilder {
    fn insert<T>(&mut self, key: String, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        if let Some(child) = value.serialize(TreeSerializer)? {
            self.entries.insert(key, child);
        }
        Ok(())
    }

    fn finish(self) -> ConfigTree {
        ConfigTree::Table(self.entries)
    }
}

impl ser::SerializeMap for TableBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        let key = match key.serialize(TreeSerializer)? {
            Some(ConfigTree::Scalar(scalar)) => scalar.into_key()?,
            Some(other) => return Err(TreeError::InvalidKey(other.type_name())),
            None => return Err(TreeError::InvalidKey("null")),
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| TreeError::Custom("map value serialized before its key".to_owned()))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(self.finish()))
    }
}

impl ser::SerializeStruct for TableBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(self.finish()))
    }
}

struct VariantTableBuilder {
    variant: &'static str,
    table: TableBuilder,
}

impl ser::SerializeStructVariant for VariantTableBuilder {
    type Ok = Built;
    type Error = TreeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), TreeError>
    where
        T: ?Sized + Serialize,
    {
        self.table.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Built, TreeError> {
        Ok(Some(single_entry(self.variant, self.table.finish())))
    }
}

// Merge-back: the tree is its own deserializer, mirroring `TreeSerializer`.

fn visit_scalar<'de, V: Visitor<'de>>(scalar: Scalar, visitor: V) -> Result<V::Value, TreeError> {
    match scalar {
        Scalar::Bool(value) => visitor.visit_bool(value),
        Scalar::I8(value) => visitor.visit_i8(value),
        Scalar::I16(value) => visitor.visit_i16(value),
        Scalar::I32(value) => visitor.visit_i32(value),
        Scalar::I64(value) => visitor.visit_i64(value),
        Scalar::U8(value) => visitor.visit_u8(value),
        Scalar::U16(value) => visitor.visit_u16(value),
        Scalar::U32(value) => visitor.visit_u32(value),
        Scalar::U64(value) => visitor.visit_u64(value),
        Scalar::F32(value) => visitor.visit_f32(value),
        Scalar::F64(value) => visitor.visit_f64(value),
        Scalar::Str(value) => visitor.visit_string(value),
    }
}

impl<'de> Deserializer<'de> for ConfigTree {
    type Error = TreeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TreeError> {
        match self {
            Self::Scalar(scalar) => visit_scalar(scalar, visitor),
            Self::List(items) => {
                SeqDeserializer::<_, TreeError>::new(items.into_iter()).deserialize_any(visitor)
            },
            Self::Table(entries) => {
                let entries = entries.into_iter().map(|(key, child)| (MapKey(key), child));
                MapDeserializer::<_, TreeError>::new(entries).deserialize_any(visitor)
            },
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TreeError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, TreeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, TreeError> {
        match self {
            Self::Scalar(Scalar::Str(variant)) => {
                visitor.visit_enum(StringDeserializer::<TreeError>::new(variant))
            },
            Self::Table(entries) if entries.len() == 1 => {
                let Some((variant, payload)) = entries.into_iter().next() else {
                    return Err(TreeError::Mismatch("empty enum table".to_owned()));
                };
                visitor.visit_enum(VariantPayload { variant, payload })
            },
            other => Err(TreeError::Mismatch(format!(
                "expected an enum variant, found {}",
                other.type_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

impl IntoDeserializer<'_, TreeError> for ConfigTree {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

// Map keys are stored as strings; integer-keyed maps parse them back.
struct MapKey(String);

macro_rules! parse_key {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TreeError> {
            match self.0.parse::<$ty>() {
                Ok(value) => visitor.$visit(value),
                Err(_) => visitor.visit_string(self.0),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for MapKey {
    type Error = TreeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TreeError> {
        visitor.visit_string(self.0)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, TreeError> {
        visitor.visit_enum(StringDeserializer::<TreeError>::new(self.0))
    }

    parse_key! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
    }

    forward_to_deserialize_any! {
        bool i128 u128 f32 f64 char str string bytes byte_buf option unit
        unit_struct newtype_struct seq tuple tuple_struct map struct identifier
        ignored_any
    }
}

impl IntoDeserializer<'_, TreeError> for MapKey {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

// Newtype, tuple and struct variants: a single-entry table keyed by variant.
struct VariantPayload {
    variant: String,
    payload: ConfigTree,
}

impl<'de> de::EnumAccess<'de> for VariantPayload {
    type Error = TreeError;
    type Variant = ConfigTree;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, ConfigTree), TreeError> {
        let variant = seed.deserialize(StringDeserializer::<TreeError>::new(self.variant))?;
        Ok((variant, self.payload))
    }
}

impl<'de> de::VariantAccess<'de> for ConfigTree {
    type Error = TreeError;

    fn unit_variant(self) -> Result<(), TreeError> {
        Err(TreeError::Mismatch(format!(
            "expected a unit variant, found {}",
            self.type_name()
        )))
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value, TreeError> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, TreeError> {
        self.deserialize_any(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, TreeError> {
        self.deserialize_any(visitor)
    }
}
