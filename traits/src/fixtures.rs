//! Hand-written object definitions for tests.

use crate::*;

macro_rules! property {
  ($name: literal, $ty: ty, $field: ident) => {
    Property {
      name: $name,
      declared: <$ty as Field>::PROPERTY_TYPE,
      get: |object, on_unsupported| Field::to_value(&object.$field, on_unsupported),
      set: Some(|object, value| match <$ty as Field>::from_property(value) {
        Some(value) => {
          object.$field = value;
          true
        }
        None => false,
      }),
    }
  };
  ($name: literal, $ty: ty, $field: ident, read_only) => {
    Property {
      name: $name,
      declared: <$ty as Field>::PROPERTY_TYPE,
      get: |object, on_unsupported| Field::to_value(&object.$field, on_unsupported),
      set: None,
    }
  };
}

macro_rules! object {
  ($ty: ident) => {
    impl Field for $ty {
      const PROPERTY_TYPE: PropertyType = PropertyType::Object(<$ty as JsonObject>::NAME);
      fn to_value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError> {
        object_to_value(self, on_unsupported)
      }
      fn from_property(value: PropertyValue) -> Option<Self> {
        object_from_property(value)
      }
    }
  };
}

#[derive(Clone, PartialEq, Default, Debug)]
pub(crate) struct Point {
  pub(crate) x: i32,
  pub(crate) y: i32,
}
impl JsonObject for Point {
  const NAME: &'static str = "fixtures::Point";
  const PROPERTIES: &'static [Property<Self>] = &[property!("X", i32, x), property!("Y", i32, y)];
}
object!(Point);

#[derive(Clone, PartialEq, Default, Debug)]
pub(crate) struct Line {
  pub(crate) start: Point,
  pub(crate) end: Point,
}
impl JsonObject for Line {
  const NAME: &'static str = "fixtures::Line";
  const PROPERTIES: &'static [Property<Self>] =
    &[property!("Start", Point, start), property!("End", Point, end)];
}
object!(Line);

#[derive(Clone, PartialEq, Default, Debug)]
pub(crate) struct Circle {
  pub(crate) x: i32,
  pub(crate) y: i32,
  pub(crate) radius: u32,
}
impl JsonObject for Circle {
  const NAME: &'static str = "fixtures::Circle";
  const PROPERTIES: &'static [Property<Self>] =
    &[property!("X", i32, x), property!("Y", i32, y), property!("Radius", u32, radius)];
}
object!(Circle);

#[derive(Clone, PartialEq, Default, Debug)]
pub(crate) struct Empty;
impl JsonObject for Empty {
  const NAME: &'static str = "fixtures::Empty";
  const PROPERTIES: &'static [Property<Self>] = &[];
}
object!(Empty);

#[derive(Clone, PartialEq, Default, Debug)]
pub(crate) struct Polygon {
  pub(crate) points: Vec<Point>,
  pub(crate) weights: Vec<Option<u8>>,
}
impl JsonObject for Polygon {
  const NAME: &'static str = "fixtures::Polygon";
  const PROPERTIES: &'static [Property<Self>] = &[
    property!("Points", Vec<Point>, points),
    property!("Weights", Vec<Option<u8>>, weights),
  ];
}
object!(Polygon);

/// A type which is never constructed by the catalog.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Sealed {
  pub(crate) seal: u64,
}
impl JsonObject for Sealed {
  const NAME: &'static str = "fixtures::Sealed";
  const PROPERTIES: &'static [Property<Self>] = &[property!("Seal", u64, seal)];
}
object!(Sealed);

#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Reading {
  pub(crate) id: Guid,
  pub(crate) taken: OffsetDateTime,
  pub(crate) label: Option<String>,
  pub(crate) tag: (String, Value),
  pub(crate) extra: Map,
  pub(crate) samples: Vec<Value>,
  pub(crate) raw: Value,
  pub(crate) level: u8,
  pub(crate) ratio: f64,
  pub(crate) active: bool,
  pub(crate) version: u32,
}
impl Default for Reading {
  fn default() -> Self {
    Self {
      id: Guid::default(),
      taken: OffsetDateTime::UNIX_EPOCH,
      label: None,
      tag: (String::new(), Value::Null),
      extra: Map::new(),
      samples: vec![],
      raw: Value::Null,
      level: 0,
      ratio: 0.0,
      active: false,
      version: 1,
    }
  }
}
impl JsonObject for Reading {
  const NAME: &'static str = "fixtures::Reading";
  const PROPERTIES: &'static [Property<Self>] = &[
    property!("Id", Guid, id),
    property!("Taken", OffsetDateTime, taken),
    property!("Label", Option<String>, label),
    property!("Tag", (String, Value), tag),
    property!("Extra", Map, extra),
    property!("Samples", Vec<Value>, samples),
    property!("Raw", Value, raw),
    property!("Level", u8, level),
    property!("Ratio", f64, ratio),
    property!("Active", bool, active),
    property!("Version", u32, version, read_only),
  ];
}
object!(Reading);

#[test]
fn hand_written_objects() {
  let line = Line { start: Point { x: 1, y: 2 }, end: Point { x: 3, y: 4 } };
  assert_eq!(to_json(&line).unwrap(), r#"{"Start":{"X":1,"Y":2},"End":{"X":3,"Y":4}}"#);
  assert_eq!(to_json(&Empty).unwrap(), "{}");
  assert_eq!(to_json(&Sealed { seal: 1 }).unwrap(), r#"{"Seal":1}"#);
  let polygon = Polygon { points: vec![Point { x: 1, y: 2 }], weights: vec![None, Some(3)] };
  assert_eq!(to_json(&polygon).unwrap(), r#"{"Points":[{"X":1,"Y":2}],"Weights":[null,3]}"#);

  let mut reading = Reading::default();
  assert_eq!(reading.type_name(), "fixtures::Reading");
  assert_eq!(reading.property("Level"), Some(Ok(Value::from(0u64))));
  assert_eq!(reading.property("Nonexistent"), None);
  assert_eq!(reading.assign("Level", PropertyValue::U8(7)), Assignment::Assigned);
  assert_eq!(reading.assign("Level", PropertyValue::U16(7)), Assignment::Rejected);
  assert_eq!(reading.assign("Version", PropertyValue::U32(7)), Assignment::ReadOnly);
  assert_eq!(reading.assign("Nonexistent", PropertyValue::Null), Assignment::Unknown);
  assert_eq!(reading.level, 7);
  assert_eq!(reading.version, 1);
}

#[test]
fn unsupported_properties() {
  let reading = Reading { ratio: f64::INFINITY, ..Reading::default() };
  assert_eq!(to_json(&reading), Err(JsonError::UnsupportedValue("non-finite float")));

  let serialized = to_json_with(&reading, OnUnsupported::Skip).unwrap();
  let value = parse(&serialized).unwrap();
  assert!(value.get("Ratio").is_none());
  assert_eq!(value.get("Level"), Some(&Value::from(0u64)));
  assert_eq!(value.get("Taken"), Some(&Value::from("1970-01-01T00:00:00.000Z")));
  assert_eq!(value.get("Id"), Some(&Value::from("00000000-0000-0000-0000-000000000000")));
  assert_eq!(value.get("Label"), Some(&Value::Null));
  assert_eq!(value.get("Tag"), Some(&parse(r#"{"":null}"#).unwrap()));
  assert_eq!(value.get("Version"), Some(&Value::from(1u64)));
}
