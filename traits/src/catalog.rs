use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::{
  Reflect, PropertyType, JsonObject, TypeRegistry,
  registry::Constructor,
};

/// A property, as recorded within the catalog.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PropertyDescriptor {
  /// The name the property is exposed with.
  pub name: &'static str,
  /// The declared type of the property.
  pub declared: PropertyType,
  /// If the property has a setter.
  pub writable: bool,
}

/// A type, as recorded within the catalog.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeDescriptor {
  /// The qualified name of the type.
  pub name: &'static str,
  /// The properties of the type, in declaration order.
  pub properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
  /// Describe a type.
  pub fn of<T: JsonObject>() -> Self {
    Self {
      name: T::NAME,
      properties: T::PROPERTIES
        .iter()
        .map(|property| PropertyDescriptor {
          name: property.name,
          declared: property.declared,
          writable: property.set.is_some(),
        })
        .collect(),
    }
  }

  /// Find a property by name.
  pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
    self.properties.iter().find(|property| property.name == name)
  }
}

pub(crate) struct CatalogEntry {
  pub(crate) descriptor: TypeDescriptor,
  constructor: Option<Constructor>,
}

impl CatalogEntry {
  pub(crate) fn instantiate(&self) -> Option<Box<dyn Reflect>> {
    self.constructor.as_ref().map(|construct| construct())
  }
}

/// An immutable snapshot of the types which may be matched against.
#[derive(Default)]
pub struct TypeCatalog {
  entries: Vec<CatalogEntry>,
}

impl core::fmt::Debug for TypeCatalog {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("TypeCatalog")
      .field("descriptors", &self.descriptors().collect::<Vec<_>>())
      .finish_non_exhaustive()
  }
}

impl TypeCatalog {
  /// Snapshot the types registered, in the order they were registered.
  ///
  /// Types within excluded namespaces are omitted. Snapshotting an unchanged registry yields an
  /// equivalent catalog.
  pub fn snapshot(registry: &TypeRegistry) -> Self {
    let mut entries = vec![];
    for registration in registry.registrations() {
      let name = registration.descriptor.name;
      if registry.is_excluded(name) {
        log::trace!("omitting `{name}` from the catalog as its namespace is excluded");
        continue;
      }
      entries.push(CatalogEntry {
        descriptor: registration.descriptor.clone(),
        constructor: registration.constructor.clone(),
      });
    }
    log::debug!(
      "snapshotted {} types into the catalog, with {} excluded",
      entries.len(),
      registry.len() - entries.len()
    );
    Self { entries }
  }

  /// The descriptors of every type within this catalog, in registration order.
  pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
    self.entries.iter().map(|entry| &entry.descriptor)
  }

  /// Find a descriptor by the qualified name of its type.
  pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
    self.descriptors().find(|descriptor| descriptor.name == name)
  }

  /// The amount of types within this catalog.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// If this catalog is empty.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub(crate) fn entries(&self) -> &[CatalogEntry] {
    &self.entries
  }
}

/// A catalog shared across threads, which may be rebuilt while in use.
///
/// Readers hold an `Arc` to a complete snapshot. Rebuilding constructs the new catalog before
/// swapping it in, and concurrent rebuilds are serialized. Nothing is torn down implicitly.
#[derive(Default, Debug)]
pub struct SharedCatalog {
  current: RwLock<Arc<TypeCatalog>>,
  rebuilding: Mutex<()>,
}

impl SharedCatalog {
  /// Create a shared catalog which is initially empty.
  pub fn new() -> Self {
    Self::default()
  }

  /// Rebuild the catalog from a registry, returning the new catalog.
  pub fn snapshot(&self, registry: &TypeRegistry) -> Arc<TypeCatalog> {
    let _rebuilding = self.rebuilding.lock().unwrap_or_else(PoisonError::into_inner);
    let catalog = Arc::new(TypeCatalog::snapshot(registry));
    *self.current.write().unwrap_or_else(PoisonError::into_inner) = catalog.clone();
    catalog
  }

  /// The current catalog.
  pub fn current(&self) -> Arc<TypeCatalog> {
    self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

#[test]
fn snapshot() {
  use crate::fixtures::{Point, Line, Empty, Reading};

  let mut registry = TypeRegistry::new();
  registry.register::<Point>().register::<Empty>().register::<Line>().register::<Reading>();

  let catalog = TypeCatalog::snapshot(&registry);
  assert_eq!(
    catalog.descriptors().map(|descriptor| descriptor.name).collect::<Vec<_>>(),
    ["fixtures::Point", "fixtures::Empty", "fixtures::Line", "fixtures::Reading"]
  );

  let point = catalog.descriptor("fixtures::Point").unwrap();
  assert_eq!(
    point.properties,
    [
      PropertyDescriptor { name: "X", declared: PropertyType::I32, writable: true },
      PropertyDescriptor { name: "Y", declared: PropertyType::I32, writable: true },
    ]
  );
  assert!(catalog.descriptor("fixtures::Empty").unwrap().properties.is_empty());
  assert_eq!(
    catalog.descriptor("fixtures::Line").unwrap().property("Start").unwrap().declared,
    PropertyType::Object("fixtures::Point")
  );
  let reading = catalog.descriptor("fixtures::Reading").unwrap();
  assert!(!reading.property("Version").unwrap().writable);
  assert_eq!(reading.property("Label").unwrap().declared, PropertyType::String);
  assert_eq!(reading.property("Taken").unwrap().declared.type_name(), "Timestamp");

  // Re-snapshotting is idempotent
  let again = TypeCatalog::snapshot(&registry);
  assert_eq!(catalog.descriptors().collect::<Vec<_>>(), again.descriptors().collect::<Vec<_>>());

  registry.exclude_namespace("fixtures::");
  assert!(TypeCatalog::snapshot(&registry).is_empty());
}

#[test]
fn shared() {
  use crate::fixtures::{Point, Line};

  let shared = Arc::new(SharedCatalog::new());
  assert!(shared.current().is_empty());

  let mut registry = TypeRegistry::new();
  registry.register::<Point>();
  let held = shared.snapshot(&registry);
  assert_eq!(held.len(), 1);

  registry.register::<Line>();
  let registry = Arc::new(registry);
  let threads = (0 .. 4)
    .map(|_| {
      let shared = shared.clone();
      let registry = registry.clone();
      std::thread::spawn(move || shared.snapshot(&registry).len())
    })
    .collect::<Vec<_>>();
  for thread in threads {
    assert_eq!(thread.join().unwrap(), 2);
  }

  // Prior snapshots remain valid after being replaced
  assert_eq!(held.len(), 1);
  assert_eq!(shared.current().len(), 2);
}
