use std::sync::Arc;

use crate::{
  JsonError, DeserializeError, OnUnsupported, Field, JsonObject, Reflect, TypeRegistry,
  TypeCatalog, SharedCatalog, MatchPolicy, Matcher, to_json_with,
};

/// A serializer and deserializer bundled with the types it may deserialize into.
///
/// The catalog is snapshotted upon creation. After registering further types, call
/// [`Codec::snapshot`] for them to be matched against.
#[derive(Debug)]
pub struct Codec {
  registry: TypeRegistry,
  catalog: SharedCatalog,
  policy: MatchPolicy,
  on_unsupported: OnUnsupported,
}

impl Codec {
  /// Create a codec for the types within a registry.
  pub fn new(registry: TypeRegistry) -> Self {
    let catalog = SharedCatalog::new();
    catalog.snapshot(&registry);
    Self {
      registry,
      catalog,
      policy: MatchPolicy::default(),
      on_unsupported: OnUnsupported::default(),
    }
  }

  /// Use the specified policy when selecting types.
  #[must_use]
  pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Use the specified handling of properties which can't be represented.
  #[must_use]
  pub fn with_on_unsupported(mut self, on_unsupported: OnUnsupported) -> Self {
    self.on_unsupported = on_unsupported;
    self
  }

  /// The registry, for registering further types.
  pub fn registry_mut(&mut self) -> &mut TypeRegistry {
    &mut self.registry
  }

  /// Rebuild the catalog from the registry.
  pub fn snapshot(&self) -> Arc<TypeCatalog> {
    self.catalog.snapshot(&self.registry)
  }

  /// The current catalog.
  pub fn catalog(&self) -> Arc<TypeCatalog> {
    self.catalog.current()
  }

  /// Serialize an item as JSON.
  pub fn serialize<T: Field>(&self, item: &T) -> Result<String, JsonError> {
    to_json_with(item, self.on_unsupported)
  }

  /// Serialize an object whose type was decided at runtime, such as one returned by
  /// [`Codec::deserialize`].
  pub fn serialize_dyn(&self, object: &dyn Reflect) -> Result<String, JsonError> {
    crate::serialize(&object.value(self.on_unsupported)?)
  }

  /// Deserialize JSON into whichever registered type it matches.
  pub fn deserialize(&self, text: &str) -> Result<Box<dyn Reflect>, DeserializeError> {
    let catalog = self.catalog.current();
    Matcher::new(&catalog).with_policy(self.policy).deserialize_str(text)
  }

  /// Deserialize JSON, requiring it match the type `T`.
  pub fn deserialize_as<T: JsonObject>(&self, text: &str) -> Result<T, DeserializeError> {
    let catalog = self.catalog.current();
    let matcher = Matcher::new(&catalog).with_policy(self.policy);
    matcher.deserialize_as(crate::parse(text)?)
  }
}

#[test]
fn codec() {
  use crate::fixtures::{Point, Line, Reading};

  let mut registry = TypeRegistry::new();
  registry.register::<Point>();
  let mut codec = Codec::new(registry);
  assert_eq!(codec.catalog().len(), 1);

  let line = Line { start: Point { x: 1, y: 2 }, end: Point { x: 3, y: 4 } };
  let serialized = codec.serialize(&line).unwrap();
  assert_eq!(serialized, r#"{"Start":{"X":1,"Y":2},"End":{"X":3,"Y":4}}"#);

  // `Line` isn't matched against until the catalog is rebuilt
  assert_eq!(codec.deserialize(&serialized).unwrap_err(), DeserializeError::NoMatch);
  codec.registry_mut().register::<Line>().register::<Reading>();
  assert_eq!(codec.catalog().len(), 1);
  assert_eq!(codec.snapshot().len(), 3);
  assert_eq!(codec.deserialize_as::<Line>(&serialized).unwrap(), line);
  let deserialized = codec.deserialize(&serialized).unwrap();
  assert_eq!(format!("{deserialized:?}"), "fixtures::Line { .. }");
  assert_eq!(codec.serialize_dyn(&*deserialized).unwrap(), serialized);

  let reading = Reading { ratio: f64::NAN, ..Reading::default() };
  assert_eq!(codec.serialize(&reading), Err(JsonError::UnsupportedValue("non-finite float")));
  let codec = codec.with_on_unsupported(OnUnsupported::Skip);
  let serialized = codec.serialize(&reading).unwrap();
  assert!(!serialized.contains("Ratio"));
  let deserialized = codec.deserialize(&serialized).unwrap();
  assert_eq!(deserialized.downcast_ref::<Reading>().unwrap().ratio.to_bits(), 0f64.to_bits());
  let defaults = codec.serialize(&Reading::default()).unwrap();
  assert_eq!(codec.serialize_dyn(&*deserialized).unwrap(), defaults);
}
