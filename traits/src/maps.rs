use std::collections::{BTreeMap, HashMap};

use crate::{JsonError, Map, Value, PropertyType, PropertyValue, OnUnsupported, Field};

impl Field for Map {
  const PROPERTY_TYPE: PropertyType = PropertyType::Mapping;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(Value::Object(self.clone()))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Mapping(map) => Some(map),
      _ => None,
    }
  }
}

impl Field for BTreeMap<String, Value> {
  const PROPERTY_TYPE: PropertyType = PropertyType::Mapping;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(Value::Object(self.iter().map(|(key, value)| (key.as_str(), value.clone())).collect()))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Mapping(map) => Some(map.into_iter().collect()),
      _ => None,
    }
  }
}

impl Field for HashMap<String, Value> {
  const PROPERTY_TYPE: PropertyType = PropertyType::Mapping;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(Value::Object(self.iter().map(|(key, value)| (key.as_str(), value.clone())).collect()))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Mapping(map) => Some(map.into_iter().collect()),
      _ => None,
    }
  }
}

/// A single key/value entry, serialized as an object with one field.
impl Field for (String, Value) {
  const PROPERTY_TYPE: PropertyType = PropertyType::Pair;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    let mut map = Map::new();
    map.insert(self.0.clone(), self.1.clone());
    Ok(Value::Object(map))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Pair(key, value) => Some((key, value)),
      _ => None,
    }
  }
}

impl Field for Value {
  const PROPERTY_TYPE: PropertyType = PropertyType::Value;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(self.clone())
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Value(value) => Some(value),
      _ => None,
    }
  }
}

#[test]
fn maps() {
  let mut map = Map::new();
  map.insert("b", Value::from(2u64));
  map.insert("a", Value::Null);
  assert_eq!(crate::to_json(&map).unwrap(), r#"{"b":2,"a":null}"#);

  // `BTreeMap` is ordered by key
  let btree =
    BTreeMap::<String, Value>::from_property(PropertyValue::Mapping(map.clone())).unwrap();
  assert_eq!(crate::to_json(&btree).unwrap(), r#"{"a":null,"b":2}"#);

  let hash = HashMap::<String, Value>::from_property(PropertyValue::Mapping(map.clone())).unwrap();
  assert_eq!(hash.len(), 2);
  assert_eq!(crate::to_value(&hash).unwrap(), Value::Object(map));
}

#[test]
fn pair() {
  let pair = ("key".to_string(), Value::from(true));
  assert_eq!(crate::to_json(&pair).unwrap(), r#"{"key":true}"#);
  assert_eq!(
    <(String, Value)>::from_property(PropertyValue::Pair("key".to_string(), Value::from(true))),
    Some(pair)
  );
}

#[test]
fn value() {
  let value = crate::parse(r#"{"a":[1,"b",null]}"#).unwrap();
  assert_eq!(crate::to_value(&value).unwrap(), value);
  assert_eq!(Value::from_property(PropertyValue::Value(value.clone())), Some(value));
}
