use shape_json_traits::{
  Value, Map, Guid, OffsetDateTime, PropertyType, PropertyDescriptor, DeserializeError, JsonObject,
  TypeRegistry, TypeCatalog, MatchPolicy, Matcher, Codec, parse, to_json,
};
use shape_json_derive::JsonObject;

#[derive(Clone, PartialEq, Debug, Default, JsonObject)]
pub struct Point {
  #[key("X")]
  pub x: i32,
  #[key("Y")]
  pub y: i32,
}

#[derive(Clone, PartialEq, Debug, Default, JsonObject)]
pub(crate) struct Line {
  #[key("Start")]
  start: Point,
  #[key("End")]
  end: Point,
}

#[derive(Clone, PartialEq, Debug, Default, JsonObject)]
struct Counter {
  #[key("N")]
  n: u8,
}

/// A sensor, as reported by a device.
#[derive(Clone, PartialEq, Debug, JsonObject)]
struct Sensor {
  /// The identifier of this sensor.
  #[key("Id")]
  id: Guid,
  #[key("Installed")]
  installed: OffsetDateTime,
  #[key("Name")]
  name: Option<String>,
  #[key("Firmware")]
  #[read_only]
  firmware: u32,
  #[skip]
  cache: Vec<u8>,
  #[key("Settings")]
  settings: Map,
  #[key("History")]
  history: Vec<Value>,
}

impl Default for Sensor {
  fn default() -> Self {
    Self {
      id: Guid::default(),
      installed: OffsetDateTime::UNIX_EPOCH,
      name: Some("unnamed".to_string()),
      firmware: 7,
      cache: vec![1, 2, 3],
      settings: Map::new(),
      history: vec![],
    }
  }
}

#[derive(Clone, PartialEq, Debug, Default, JsonObject)]
struct Path {
  #[key("Points")]
  points: Vec<Point>,
  #[key("Ends")]
  ends: [u8; 2],
}

/// A type registered without a constructor.
#[derive(Clone, PartialEq, Debug, JsonObject)]
struct Shape {
  #[key("Kind")]
  kind: String,
}

#[derive(Clone, PartialEq, Debug, Default, JsonObject)]
struct Unit;

mod hidden {
  use super::*;

  #[derive(Clone, PartialEq, Debug, Default, JsonObject)]
  pub struct Secret {
    #[key("Password")]
    pub password: String,
  }
}

fn registry() -> TypeRegistry {
  let mut registry = TypeRegistry::new();
  registry
    .register::<Point>()
    .register::<Line>()
    .register::<Counter>()
    .register::<Sensor>()
    .register::<Unit>()
    .register_with::<Shape>(None);
  registry
}

#[test]
fn names() {
  assert_eq!(Point::NAME, "tests::Point");
  assert_eq!(hidden::Secret::NAME, "tests::hidden::Secret");
  assert_eq!(Unit::PROPERTIES.len(), 0);
  assert_eq!(to_json(&Unit).unwrap(), "{}");
}

#[test]
fn structural_match() {
  let catalog = TypeCatalog::snapshot(&registry());
  let matcher = Matcher::new(&catalog);

  let point = matcher.deserialize_str(r#"{"X":1,"Y":2}"#).unwrap();
  assert_eq!(point.type_name(), "tests::Point");
  assert_eq!(point.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));

  let line = Line { start: Point { x: 1, y: 2 }, end: Point { x: 3, y: 4 } };
  let serialized = to_json(&line).unwrap();
  assert_eq!(serialized, r#"{"Start":{"X":1,"Y":2},"End":{"X":3,"Y":4}}"#);
  assert_eq!(matcher.deserialize_as::<Line>(parse(&serialized).unwrap()).unwrap(), line);
  assert_eq!(
    catalog.descriptor("tests::Line").unwrap().property("Start").unwrap().declared,
    PropertyType::Object("tests::Point")
  );

  let counter = matcher.deserialize_as::<Counter>(parse(r#"{"N":300}"#).unwrap()).unwrap();
  assert_eq!(counter.n, 44);
  let counter = matcher.deserialize_as::<Counter>(parse(r#"{"N":1,"N":2}"#).unwrap()).unwrap();
  assert_eq!(counter.n, 2);

  assert!(matcher.deserialize_str("{}").unwrap().is::<Unit>());
}

#[test]
fn snapshot_is_idempotent() {
  let registry = registry();
  let first = TypeCatalog::snapshot(&registry);
  let second = TypeCatalog::snapshot(&registry);
  assert_eq!(first.len(), 6);
  assert_eq!(first.descriptors().collect::<Vec<_>>(), second.descriptors().collect::<Vec<_>>());
}

#[test]
fn policies() {
  let catalog = TypeCatalog::snapshot(&registry());

  // The last key scanned decides the type
  let last = Matcher::new(&catalog).with_policy(MatchPolicy::LastMatchWins);
  assert!(last.deserialize_str(r#"{"X":1,"N":5}"#).unwrap().is::<Counter>());
  assert!(last.deserialize_str(r#"{"N":5,"X":1}"#).unwrap().is::<Point>());

  // Either order has a single key present for both, yet `Counter` has none absent
  let best = Matcher::new(&catalog);
  assert!(best.deserialize_str(r#"{"X":1,"N":5}"#).unwrap().is::<Counter>());
  assert!(best.deserialize_str(r#"{"N":5,"X":1}"#).unwrap().is::<Counter>());
}

#[test]
fn instantiation() {
  let catalog = TypeCatalog::snapshot(&registry());
  assert_eq!(
    Matcher::new(&catalog).deserialize_str(r#"{"Kind":"circle"}"#).unwrap_err(),
    DeserializeError::TypeInstantiation { type_name: "tests::Shape" }
  );
  assert_eq!(to_json(&Shape { kind: "circle".to_string() }).unwrap(), r#"{"Kind":"circle"}"#);
}

#[test]
fn attributes() {
  let catalog = TypeCatalog::snapshot(&registry());
  let descriptor = catalog.descriptor("tests::Sensor").unwrap();
  assert_eq!(
    descriptor.properties.iter().map(|property| property.name).collect::<Vec<_>>(),
    ["Id", "Installed", "Name", "Firmware", "Settings", "History"]
  );
  assert_eq!(
    descriptor.property("Firmware"),
    Some(&PropertyDescriptor { name: "Firmware", declared: PropertyType::U32, writable: false })
  );
  assert_eq!(descriptor.property("Name").unwrap().declared, PropertyType::String);

  let text = r#"{
    "Id": "00112233-4455-6677-8899-aabbccddeeff",
    "Installed": "2024-01-02T03:04:05.006Z",
    "Name": null,
    "Firmware": 9,
    "Settings": {"a": 1},
    "History": [1, "b"]
  }"#;
  let sensor = Matcher::new(&catalog).deserialize_as::<Sensor>(parse(text).unwrap()).unwrap();
  assert_eq!(sensor.id, Guid::parse("00112233-4455-6677-8899-aabbccddeeff").unwrap());
  assert_eq!(sensor.installed.unix_timestamp(), 1_704_164_645);
  assert_eq!(sensor.installed.millisecond(), 6);
  assert_eq!(sensor.name, None);
  assert_eq!(sensor.firmware, 7);
  assert_eq!(sensor.cache, [1, 2, 3]);
  assert_eq!(Value::Object(sensor.settings.clone()), parse(r#"{"a":1}"#).unwrap());
  assert_eq!(Value::Array(sensor.history.clone()), parse(r#"[1,"b"]"#).unwrap());

  assert_eq!(
    to_json(&sensor).unwrap(),
    concat!(
      r#"{"Id":"00112233-4455-6677-8899-aabbccddeeff","Installed":"2024-01-02T03:04:05.006Z","#,
      r#""Name":null,"Firmware":7,"Settings":{"a":1},"History":[1,"b"]}"#,
    )
  );
}

#[test]
fn excluded_namespace() {
  let text = r#"{"Password":"hunter2"}"#;

  let mut registry = registry();
  registry.register::<hidden::Secret>();
  let catalog = TypeCatalog::snapshot(&registry);
  let secret = Matcher::new(&catalog).deserialize_as::<hidden::Secret>(parse(text).unwrap());
  assert_eq!(secret.unwrap().password, "hunter2");

  registry.exclude_namespace("tests::hidden::");
  let catalog = TypeCatalog::snapshot(&registry);
  assert!(catalog.descriptor("tests::hidden::Secret").is_none());
  assert_eq!(Matcher::new(&catalog).deserialize_str(text).unwrap_err(), DeserializeError::NoMatch);
}

#[test]
fn typed_sequences() {
  let mut registry = TypeRegistry::new();
  registry.register::<Point>().register::<Path>();
  let catalog = TypeCatalog::snapshot(&registry);
  let matcher = Matcher::new(&catalog);

  let path = Path { points: vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }], ends: [0, 1] };
  let serialized = to_json(&path).unwrap();
  assert_eq!(serialized, r#"{"Points":[{"X":1,"Y":2},{"X":3,"Y":4}],"Ends":[0,1]}"#);
  assert_eq!(matcher.deserialize_as::<Path>(parse(&serialized).unwrap()).unwrap(), path);
  assert_eq!(
    catalog.descriptor("tests::Path").unwrap().property("Points").unwrap().declared,
    PropertyType::Sequence(&PropertyType::Object("tests::Point"))
  );

  // Arrays require exactly as many items as they hold
  assert_eq!(
    matcher.deserialize_str(r#"{"Points":[],"Ends":[1,2,3]}"#).unwrap_err(),
    DeserializeError::PropertyCoercion {
      type_name: "tests::Path",
      property: "Ends",
      expected: "Sequence",
      found: "array",
    }
  );
}

#[test]
fn codec() {
  let mut codec = Codec::new(TypeRegistry::new());
  assert!(codec.catalog().is_empty());
  codec.registry_mut().register::<Point>().register::<Line>();
  codec.snapshot();

  let line = Line { start: Point { x: -1, y: 0 }, end: Point { x: 5, y: 6 } };
  let serialized = codec.serialize(&line).unwrap();
  assert_eq!(codec.deserialize_as::<Line>(&serialized).unwrap(), line);
  assert_eq!(
    codec.deserialize_as::<Point>(&serialized).unwrap_err(),
    DeserializeError::UnexpectedType { expected: "tests::Point", found: "tests::Line" }
  );
}
