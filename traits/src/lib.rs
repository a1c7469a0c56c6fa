#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub use shape_json::*;

mod primitives;
mod string;
mod sequences;
mod maps;
mod option;
mod boxed;

mod coerce;
mod guid;
pub use guid::Guid;

mod reflect;
pub use reflect::{Assignment, Reflect};
mod registry;
pub use registry::TypeRegistry;
mod catalog;
pub use catalog::{PropertyDescriptor, TypeDescriptor, TypeCatalog, SharedCatalog};
mod matcher;
pub use matcher::{MatchPolicy, MatchResult, Matcher};
mod codec;
pub use codec::Codec;

pub use time::OffsetDateTime;

#[cfg(test)]
mod fixtures;

/// The declared type of a property.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PropertyType {
  /// A boolean.
  Bool,
  /// An `i8`.
  I8,
  /// An `i16`.
  I16,
  /// An `i32`.
  I32,
  /// An `i64`.
  I64,
  /// A `u8`.
  U8,
  /// A `u16`.
  U16,
  /// A `u32`.
  U32,
  /// A `u64`.
  U64,
  /// An `f32`.
  F32,
  /// An `f64`.
  F64,
  /// A string.
  String,
  /// A point in time.
  Timestamp,
  /// A globally-unique identifier.
  Guid,
  /// A sequence of items of the declared type.
  Sequence(&'static PropertyType),
  /// A mapping of keys to generic values.
  Mapping,
  /// A single key/value entry.
  ///
  /// When deserialized, only the first entry of the mapping present is kept.
  Pair,
  /// Any generic value.
  Value,
  /// An object, identified by the qualified name of its type.
  Object(&'static str),
}

impl PropertyType {
  /// The name of this declared type.
  pub fn type_name(&self) -> &'static str {
    match self {
      PropertyType::Bool => "bool",
      PropertyType::I8 => "i8",
      PropertyType::I16 => "i16",
      PropertyType::I32 => "i32",
      PropertyType::I64 => "i64",
      PropertyType::U8 => "u8",
      PropertyType::U16 => "u16",
      PropertyType::U32 => "u32",
      PropertyType::U64 => "u64",
      PropertyType::F32 => "f32",
      PropertyType::F64 => "f64",
      PropertyType::String => "String",
      PropertyType::Timestamp => "Timestamp",
      PropertyType::Guid => "Guid",
      PropertyType::Sequence(_) => "Sequence",
      PropertyType::Mapping => "Mapping",
      PropertyType::Pair => "Pair",
      PropertyType::Value => "Value",
      PropertyType::Object(name) => name,
    }
  }
}

/// A value which has been coerced into the representation of a declared type, ready to be
/// assigned to a property.
pub enum PropertyValue {
  /// `null`, which only optional properties accept.
  Null,
  /// A boolean.
  Bool(bool),
  /// An `i8`.
  I8(i8),
  /// An `i16`.
  I16(i16),
  /// An `i32`.
  I32(i32),
  /// An `i64`.
  I64(i64),
  /// A `u8`.
  U8(u8),
  /// A `u16`.
  U16(u16),
  /// A `u32`.
  U32(u32),
  /// A `u64`.
  U64(u64),
  /// An `f32`.
  F32(f32),
  /// An `f64`.
  F64(f64),
  /// A string.
  String(String),
  /// A point in time.
  Timestamp(OffsetDateTime),
  /// A globally-unique identifier.
  Guid(Guid),
  /// A sequence of items, each coerced to the declared item type.
  Sequence(Vec<PropertyValue>),
  /// A mapping of keys to generic values.
  Mapping(Map),
  /// A single key/value entry.
  Pair(String, Value),
  /// Any generic value.
  Value(Value),
  /// An object which was itself deserialized.
  Object(Box<dyn Reflect>),
}

/// What to do when a property's value can't be represented within JSON.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum OnUnsupported {
  /// Fail the entire serialization.
  #[default]
  Abort,
  /// Omit the property from its object.
  Skip,
}

/// An item which may be the value of a property.
pub trait Field: Sized {
  /// The type a property holding this is declared as.
  const PROPERTY_TYPE: PropertyType;

  /// Convert this into a generic value.
  fn to_value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError>;

  /// Recover this from a value coerced to its declared type.
  ///
  /// Returns `None` if the value was of another representation.
  ///
  /// `PropertyValue::Null` is only accepted by items with a representation of `null`.
  fn from_property(value: PropertyValue) -> Option<Self>;
}

/// A property of an object.
///
/// These are generated by `#[derive(JsonObject)]`, yet may be written by hand.
pub struct Property<T: 'static> {
  /// The name this property is exposed with.
  pub name: &'static str,
  /// The declared type of this property.
  pub declared: PropertyType,
  /// Read this property as a generic value.
  pub get: fn(&T, OnUnsupported) -> Result<Value, JsonError>,
  /// Assign this property, returning `false` if the value was of another representation.
  ///
  /// Properties without a setter are read-only.
  pub set: Option<fn(&mut T, PropertyValue) -> bool>,
}

/// An object with a table of properties.
pub trait JsonObject: 'static + Sized {
  /// The qualified name of this type (`module::path::Type`).
  const NAME: &'static str;
  /// The properties of this type, in declaration order.
  const PROPERTIES: &'static [Property<Self>];
}

/// Convert an object into a generic value via its properties.
///
/// This is the `Field::to_value` implementation for objects.
pub fn object_to_value<T: JsonObject>(
  object: &T,
  on_unsupported: OnUnsupported,
) -> Result<Value, JsonError> {
  let mut map = Map::new();
  for property in T::PROPERTIES {
    match (property.get)(object, on_unsupported) {
      Ok(value) => {
        map.insert(property.name, value);
      }
      Err(e) => match on_unsupported {
        OnUnsupported::Abort => Err(e)?,
        OnUnsupported::Skip => {
          log::debug!("skipping property `{}` of `{}`: {e}", property.name, T::NAME);
        }
      },
    }
  }
  Ok(Value::Object(map))
}

/// Recover an object from a coerced value.
///
/// This is the `Field::from_property` implementation for objects.
pub fn object_from_property<T: JsonObject>(value: PropertyValue) -> Option<T> {
  match value {
    PropertyValue::Object(object) => object.downcast::<T>().map(|object| *object),
    _ => None,
  }
}

/// Convert an item into a generic value.
///
/// Any property which can't be represented causes this to fail.
pub fn to_value<T: Field>(item: &T) -> Result<Value, JsonError> {
  item.to_value(OnUnsupported::Abort)
}

/// Serialize an item as JSON.
///
/// Any property which can't be represented causes this to fail.
pub fn to_json<T: Field>(item: &T) -> Result<String, JsonError> {
  to_json_with(item, OnUnsupported::Abort)
}

/// Serialize an item as JSON, with the specified handling of unrepresentable properties.
pub fn to_json_with<T: Field>(
  item: &T,
  on_unsupported: OnUnsupported,
) -> Result<String, JsonError> {
  serialize(&item.to_value(on_unsupported)?)
}

/// An error incurred when deserializing a typed object.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DeserializeError {
  /// The JSON itself was invalid.
  Json(JsonError),
  /// The top-level value wasn't an object, so no type could be matched against it.
  NotAnObject,
  /// No type in the catalog matched the object.
  NoMatch,
  /// The matched type had no constructor registered.
  TypeInstantiation {
    /// The name of the type which couldn't be instantiated.
    type_name: &'static str,
  },
  /// A value couldn't be coerced to its property's declared type.
  PropertyCoercion {
    /// The name of the type whose property was being assigned.
    type_name: &'static str,
    /// The name of the property.
    property: &'static str,
    /// The declared type of the property.
    expected: &'static str,
    /// What was present.
    found: &'static str,
  },
  /// The type matched wasn't the type requested.
  UnexpectedType {
    /// The name of the type requested.
    expected: &'static str,
    /// The name of the type matched.
    found: &'static str,
  },
}

impl From<JsonError> for DeserializeError {
  fn from(e: JsonError) -> Self {
    DeserializeError::Json(e)
  }
}

impl core::fmt::Display for DeserializeError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      DeserializeError::Json(e) => write!(f, "invalid JSON: {e}"),
      DeserializeError::NotAnObject => f.write_str("only objects may be matched against types"),
      DeserializeError::NoMatch => f.write_str("no registered type matched the object"),
      DeserializeError::TypeInstantiation { type_name } => {
        write!(f, "`{type_name}` has no constructor registered")
      }
      DeserializeError::PropertyCoercion { type_name, property, expected, found } => write!(
        f,
        "`{type_name}::{property}` is declared as `{expected}` yet `{found}` was present"
      ),
      DeserializeError::UnexpectedType { expected, found } => {
        write!(f, "expected `{expected}` yet matched `{found}`")
      }
    }
  }
}

impl std::error::Error for DeserializeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      DeserializeError::Json(e) => Some(e),
      _ => None,
    }
  }
}
