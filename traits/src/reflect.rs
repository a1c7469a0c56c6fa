use core::any::Any;

use crate::{JsonError, Value, PropertyValue, OnUnsupported, JsonObject, object_to_value};

/// The outcome of assigning a property.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Assignment {
  /// The property was assigned.
  Assigned,
  /// The property has no setter, so nothing was done.
  ReadOnly,
  /// The value was of a representation the property doesn't accept.
  Rejected,
  /// The object has no property with this name.
  Unknown,
}

/// An object whose type was decided at runtime.
///
/// This is implemented for every `JsonObject`.
pub trait Reflect: Any {
  /// The qualified name of this object's type.
  fn type_name(&self) -> &'static str;

  /// Convert this object into a generic value.
  fn value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError>;

  /// Read a single property as a generic value.
  fn property(&self, name: &str) -> Option<Result<Value, JsonError>>;

  /// Assign a property.
  fn assign(&mut self, name: &str, value: PropertyValue) -> Assignment;
}

impl<T: JsonObject> Reflect for T {
  fn type_name(&self) -> &'static str {
    T::NAME
  }

  fn value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError> {
    object_to_value(self, on_unsupported)
  }

  fn property(&self, name: &str) -> Option<Result<Value, JsonError>> {
    T::PROPERTIES
      .iter()
      .find(|property| property.name == name)
      .map(|property| (property.get)(self, OnUnsupported::Abort))
  }

  fn assign(&mut self, name: &str, value: PropertyValue) -> Assignment {
    let Some(property) = T::PROPERTIES.iter().find(|property| property.name == name) else {
      return Assignment::Unknown;
    };
    match property.set {
      Some(set) => {
        if set(self, value) {
          Assignment::Assigned
        } else {
          Assignment::Rejected
        }
      }
      None => Assignment::ReadOnly,
    }
  }
}

impl dyn Reflect {
  /// If this object is of type `T`.
  pub fn is<T: Any>(&self) -> bool {
    let any: &dyn Any = self;
    any.is::<T>()
  }

  /// A reference to this object as a `T`, if it is one.
  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    let any: &dyn Any = self;
    any.downcast_ref::<T>()
  }

  /// This object as a `T`, if it is one.
  pub fn downcast<T: Any>(self: Box<Self>) -> Option<Box<T>> {
    let any: Box<dyn Any> = self;
    any.downcast::<T>().ok()
  }
}

impl core::fmt::Debug for dyn Reflect {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct(self.type_name()).finish_non_exhaustive()
  }
}
