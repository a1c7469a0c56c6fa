use std::{any::TypeId, sync::Arc};

use crate::{Reflect, JsonObject, TypeDescriptor};

/// A function producing a default instance of a type.
pub(crate) type Constructor = Arc<dyn Fn() -> Box<dyn Reflect> + Send + Sync>;

pub(crate) struct Registration {
  type_id: TypeId,
  pub(crate) descriptor: TypeDescriptor,
  pub(crate) constructor: Option<Constructor>,
}

/// The set of types which may be matched against when deserializing.
///
/// This is built by the host, then snapshotted into a `TypeCatalog`. Types are considered in the
/// order they were registered.
pub struct TypeRegistry {
  types: Vec<Registration>,
  excluded: Vec<String>,
}

impl Default for TypeRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl core::fmt::Debug for TypeRegistry {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("TypeRegistry")
      .field("types", &self.types.iter().map(|ty| ty.descriptor.name).collect::<Vec<_>>())
      .field("excluded", &self.excluded)
      .finish()
  }
}

impl TypeRegistry {
  /// Create an empty registry.
  ///
  /// The `core::`, `alloc::`, and `std::` namespaces are excluded by default.
  pub fn new() -> Self {
    Self { types: vec![], excluded: vec!["core::".into(), "alloc::".into(), "std::".into()] }
  }

  /// Register a type, constructed via its `Default` implementation.
  pub fn register<T: JsonObject + Default>(&mut self) -> &mut Self {
    self.register_with::<T>(Some(T::default))
  }

  /// Register a type with the specified constructor.
  ///
  /// A type without a constructor may still be matched, yet will fail to be instantiated.
  /// Registering a type again replaces its prior registration, keeping its position.
  pub fn register_with<T: JsonObject>(&mut self, constructor: Option<fn() -> T>) -> &mut Self {
    let constructor = constructor.map(|construct| -> Constructor {
      Arc::new(move || -> Box<dyn Reflect> { Box::new(construct()) })
    });
    let registration = Registration {
      type_id: TypeId::of::<T>(),
      descriptor: TypeDescriptor::of::<T>(),
      constructor,
    };

    match self.types.iter_mut().find(|existing| existing.type_id == registration.type_id) {
      Some(existing) => *existing = registration,
      None => self.types.push(registration),
    }
    self
  }

  /// Exclude every type whose qualified name starts with this prefix.
  ///
  /// The prefix should include its trailing `::`, as with `my_crate::internal::`.
  pub fn exclude_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
    self.excluded.push(namespace.into());
    self
  }

  /// If a qualified name lies within an excluded namespace.
  pub fn is_excluded(&self, name: &str) -> bool {
    self.excluded.iter().any(|namespace| name.starts_with(namespace.as_str()))
  }

  /// The amount of types registered.
  pub fn len(&self) -> usize {
    self.types.len()
  }

  /// If no types have been registered.
  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  pub(crate) fn registrations(&self) -> &[Registration] {
    &self.types
  }
}

#[test]
fn registration() {
  use crate::fixtures::{Point, Line};

  let mut registry = TypeRegistry::new();
  assert!(registry.is_empty());
  registry.register::<Point>().register::<Line>();
  assert_eq!(registry.len(), 2);

  // Re-registering replaces, in place
  registry.register_with::<Point>(None);
  assert_eq!(registry.len(), 2);
  assert_eq!(registry.registrations()[0].descriptor.name, "fixtures::Point");
  assert!(registry.registrations()[0].constructor.is_none());

  assert!(registry.is_excluded("core::option::Option"));
  assert!(!registry.is_excluded("fixtures::Point"));
  registry.exclude_namespace("fixtures::");
  assert!(registry.is_excluded("fixtures::Point"));
}
