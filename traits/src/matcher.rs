use crate::{
  Parser, Map, Value, PropertyType, PropertyValue, DeserializeError, JsonObject, Guid,
  Assignment, Reflect, TypeDescriptor, TypeCatalog,
  coerce::{narrow, parse_timestamp},
};

/// How the type owning an object is selected from the catalog.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum MatchPolicy {
  /// For every key, in order, every type declaring a property with that name becomes the
  /// candidate. The last candidate wins.
  ///
  /// The outcome depends on the order of the keys and of the registrations.
  LastMatchWins,
  /// The type declaring the most properties present within the object wins.
  ///
  /// Ties are broken by the fewest declared properties absent from the object, then by the order
  /// the types were registered in.
  #[default]
  BestOverlap,
}

/// The type judged to own an object.
#[derive(Clone, Copy, Debug)]
pub struct MatchResult<'c> {
  index: usize,
  /// The descriptor of the type.
  pub descriptor: &'c TypeDescriptor,
  /// How many of the type's properties were present within the object.
  pub score: usize,
}

/// Deserializes objects into the types within a catalog they structurally match.
#[derive(Clone, Copy, Debug)]
pub struct Matcher<'c> {
  catalog: &'c TypeCatalog,
  policy: MatchPolicy,
  parser: Parser,
}

impl<'c> Matcher<'c> {
  /// Create a matcher over a catalog, with the default policy.
  pub fn new(catalog: &'c TypeCatalog) -> Self {
    Self { catalog, policy: MatchPolicy::default(), parser: Parser::new() }
  }

  /// Use the specified policy when selecting types.
  #[must_use]
  pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Use the specified parser when deserializing text.
  #[must_use]
  pub fn with_parser(mut self, parser: Parser) -> Self {
    self.parser = parser;
    self
  }

  fn score(descriptor: &TypeDescriptor, map: &Map) -> usize {
    descriptor.properties.iter().filter(|property| map.contains_key(property.name)).count()
  }

  /// Select the type owning an object.
  ///
  /// An empty object is owned by the first type without any properties.
  pub fn best_match(&self, map: &Map) -> Result<MatchResult<'c>, DeserializeError> {
    let entries = self.catalog.entries();

    let index = if map.is_empty() {
      entries.iter().position(|entry| entry.descriptor.properties.is_empty())
    } else {
      match self.policy {
        MatchPolicy::LastMatchWins => {
          let mut candidate = None;
          for key in map.keys() {
            for (i, entry) in entries.iter().enumerate() {
              if entry.descriptor.property(key).is_some() {
                log::trace!("`{}` declares `{key}`", entry.descriptor.name);
                candidate = Some(i);
              }
            }
          }
          candidate
        }
        MatchPolicy::BestOverlap => {
          // (index, score, absent)
          let mut best: Option<(usize, usize, usize)> = None;
          for (i, entry) in entries.iter().enumerate() {
            let score = Self::score(&entry.descriptor, map);
            if score == 0 {
              continue;
            }
            let absent = entry.descriptor.properties.len() - score;
            log::trace!(
              "`{}` has {score} properties present and {absent} absent",
              entry.descriptor.name
            );
            let better = match best {
              None => true,
              Some((_, best_score, best_absent)) => {
                (score > best_score) || ((score == best_score) && (absent < best_absent))
              }
            };
            if better {
              best = Some((i, score, absent));
            }
          }
          best.map(|(i, _, _)| i)
        }
      }
    };

    let index = index.ok_or(DeserializeError::NoMatch)?;
    let descriptor = &entries[index].descriptor;
    let score = Self::score(descriptor, map);
    log::debug!("matched `{}` with {score} properties present", descriptor.name);
    Ok(MatchResult { index, descriptor, score })
  }

  /// Coerce a value to a declared type.
  ///
  /// `None` is returned if the property should be left unset.
  fn coerce(
    &self,
    type_name: &'static str,
    property: &'static str,
    declared: PropertyType,
    value: Value,
  ) -> Result<Option<PropertyValue>, DeserializeError> {
    let coercion = |found: &'static str| DeserializeError::PropertyCoercion {
      type_name,
      property,
      expected: declared.type_name(),
      found,
    };
    let found = value.type_name();

    Ok(Some(match (declared, value) {
      (PropertyType::Value, value) => PropertyValue::Value(value),
      (_, Value::Null) => PropertyValue::Null,
      (PropertyType::Bool, Value::Bool(value)) => PropertyValue::Bool(value),
      (PropertyType::String, Value::String(value)) => PropertyValue::String(value),
      (PropertyType::Sequence(item), Value::Array(items)) => PropertyValue::Sequence(
        items
          .into_iter()
          .map(|value| -> Result<_, DeserializeError> {
            let coerced = self.coerce(type_name, property, *item, value)?;
            Ok(coerced.unwrap_or(PropertyValue::Null))
          })
          .collect::<Result<_, _>>()?,
      ),
      (PropertyType::Mapping, Value::Object(map)) => PropertyValue::Mapping(map),
      (PropertyType::Pair, Value::Object(map)) => {
        let mut entries = map.into_iter();
        let Some((key, value)) = entries.next() else { return Ok(None) };
        let dropped = entries.count();
        if dropped != 0 {
          log::debug!(
            "`{type_name}::{property}` holds a single pair, dropping {dropped} further entries"
          );
        }
        PropertyValue::Pair(key, value)
      }
      (PropertyType::Timestamp, Value::String(text)) => {
        PropertyValue::Timestamp(parse_timestamp(&text).ok_or_else(|| coercion(found))?)
      }
      (PropertyType::Guid, Value::String(text)) => {
        PropertyValue::Guid(Guid::parse(&text).ok_or_else(|| coercion(found))?)
      }
      (PropertyType::Object(name), Value::Object(map)) => {
        let matched = self.best_match(&map)?;
        if matched.descriptor.name != name {
          Err(coercion(matched.descriptor.name))?;
        }
        PropertyValue::Object(self.populate(matched, map)?)
      }
      (declared, Value::Number(number)) => narrow(declared, number).ok_or_else(|| coercion(found))?,
      _ => Err(coercion(found))?,
    }))
  }

  /// Instantiate the matched type and assign its properties from the object.
  fn populate(
    &self,
    matched: MatchResult<'c>,
    mut map: Map,
  ) -> Result<Box<dyn Reflect>, DeserializeError> {
    let entry = &self.catalog.entries()[matched.index];
    let type_name = entry.descriptor.name;
    let mut object =
      entry.instantiate().ok_or(DeserializeError::TypeInstantiation { type_name })?;

    for property in &entry.descriptor.properties {
      let Some(value) = map.remove(property.name) else { continue };
      if !property.writable {
        log::debug!("not assigning `{type_name}::{}` as it's read-only", property.name);
        continue;
      }

      let found = value.type_name();
      let coerced = self.coerce(type_name, property.name, property.declared, value)?;
      let Some(coerced) = coerced else { continue };
      let null = matches!(coerced, PropertyValue::Null);
      match object.assign(property.name, coerced) {
        Assignment::Assigned | Assignment::ReadOnly | Assignment::Unknown => {}
        // `null` leaves non-optional properties at their defaults
        Assignment::Rejected if null => {}
        Assignment::Rejected => Err(DeserializeError::PropertyCoercion {
          type_name,
          property: property.name,
          expected: property.declared.type_name(),
          found,
        })?,
      }
    }

    Ok(object)
  }

  /// Deserialize an object into whichever type within the catalog it matches.
  pub fn deserialize(&self, value: Value) -> Result<Box<dyn Reflect>, DeserializeError> {
    if log::log_enabled!(log::Level::Trace) {
      dump(None, &value, 0);
    }
    let Value::Object(map) = value else { return Err(DeserializeError::NotAnObject) };
    let matched = self.best_match(&map)?;
    self.populate(matched, map)
  }

  /// Parse and deserialize an object.
  pub fn deserialize_str(&self, text: &str) -> Result<Box<dyn Reflect>, DeserializeError> {
    self.deserialize(self.parser.parse(text)?)
  }

  /// Deserialize an object, requiring it match the type `T`.
  pub fn deserialize_as<T: JsonObject>(&self, value: Value) -> Result<T, DeserializeError> {
    let object = self.deserialize(value)?;
    let found = object.type_name();
    object
      .downcast::<T>()
      .map(|object| *object)
      .ok_or(DeserializeError::UnexpectedType { expected: T::NAME, found })
  }
}

/// Log the structure of a value tree.
fn dump(key: Option<&str>, value: &Value, depth: usize) {
  let indent = depth * 2;
  let key = key.map(|key| format!("{key:?}: ")).unwrap_or_default();
  match value {
    Value::Array(items) => {
      log::trace!("{:indent$}{key}array of {}", "", items.len());
      for item in items {
        dump(None, item, depth + 1);
      }
    }
    Value::Object(map) => {
      log::trace!("{:indent$}{key}object of {}", "", map.len());
      for (key, value) in map.iter() {
        dump(Some(key), value, depth + 1);
      }
    }
    value => log::trace!("{:indent$}{key}{value:?}", ""),
  }
}

#[cfg(test)]
fn catalog() -> TypeCatalog {
  use crate::{TypeRegistry, fixtures::*};

  let mut registry = TypeRegistry::new();
  registry
    .register::<Empty>()
    .register::<Point>()
    .register::<Line>()
    .register::<Circle>()
    .register::<Reading>()
    .register::<Polygon>()
    .register_with::<Sealed>(None);
  TypeCatalog::snapshot(&registry)
}

#[test]
fn best_overlap() {
  use crate::{parse, fixtures::*};

  let catalog = catalog();
  let matcher = Matcher::new(&catalog);

  let point = matcher.deserialize_str(r#"{"X":1,"Y":2}"#).unwrap();
  assert_eq!(point.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));

  let circle = matcher.deserialize_str(r#"{"Y":2,"Radius":3}"#).unwrap();
  assert_eq!(circle.downcast_ref::<Circle>(), Some(&Circle { x: 0, y: 2, radius: 3 }));

  let line = matcher
    .deserialize_as::<Line>(parse(r#"{"Start":{"X":1,"Y":2},"End":{"Y":4,"X":3}}"#).unwrap())
    .unwrap();
  assert_eq!(line, Line { start: Point { x: 1, y: 2 }, end: Point { x: 3, y: 4 } });

  let empty = matcher.deserialize_str("{}").unwrap();
  assert!(empty.is::<Empty>());

  let matched = matcher.best_match(parse(r#"{"X":1,"Radius":2}"#).unwrap().as_object().unwrap());
  let matched = matched.unwrap();
  assert_eq!((matched.descriptor.name, matched.score), ("fixtures::Circle", 2));
}

#[test]
fn last_match_wins() {
  use crate::fixtures::*;

  let catalog = catalog();
  let matcher = Matcher::new(&catalog).with_policy(MatchPolicy::LastMatchWins);

  // `Circle` was registered after `Point`, so it declares `X` last
  let object = matcher.deserialize_str(r#"{"X":1,"Y":2}"#).unwrap();
  assert_eq!(object.downcast_ref::<Circle>(), Some(&Circle { x: 1, y: 2, radius: 0 }));

  // `Radius` is only declared by `Circle`, yet `Seal` is the last key
  assert_eq!(
    matcher.deserialize_str(r#"{"Radius":1,"Seal":2}"#).unwrap_err(),
    DeserializeError::TypeInstantiation { type_name: "fixtures::Sealed" }
  );
  let object = matcher.deserialize_str(r#"{"Seal":2,"Radius":1}"#).unwrap();
  assert!(object.is::<Circle>());
}

#[test]
fn populate() {
  use crate::{parse, fixtures::*};
  use time::macros::datetime;

  let catalog = catalog();
  let matcher = Matcher::new(&catalog);

  let reading = matcher
    .deserialize_as::<Reading>(
      parse(
        r#"{
          "Id": "00112233-4455-6677-8899-aabbccddeeff",
          "Taken": "/Date(621355968000000000)/",
          "Label": "kitchen",
          "Tag": {"first": [1], "second": 2},
          "Extra": {"a": 1, "b": null},
          "Samples": [1, 2.5, "three"],
          "Raw": true,
          "Level": 300,
          "Ratio": 1,
          "Active": true,
          "Version": 5,
          "Unknown": 6
        }"#,
      )
      .unwrap(),
    )
    .unwrap();
  assert_eq!(reading.id.to_string(), "00112233-4455-6677-8899-aabbccddeeff");
  assert_eq!(reading.taken, datetime!(1970-01-01 0:00 UTC));
  assert_eq!(reading.label.as_deref(), Some("kitchen"));
  assert_eq!(reading.tag, ("first".to_string(), parse("[1]").unwrap()));
  assert_eq!(reading.extra, parse(r#"{"b":null,"a":1}"#).unwrap().as_object().unwrap().clone());
  assert_eq!(Value::Array(reading.samples), parse(r#"[1,2.5,"three"]"#).unwrap());
  assert_eq!(reading.raw, Value::Bool(true));
  assert_eq!(reading.level, 44);
  assert_eq!(reading.ratio.to_bits(), 1f64.to_bits());
  assert!(reading.active);
  assert_eq!(reading.version, 1);

  // `null` clears optional properties and leaves the rest at their defaults
  let reading = matcher
    .deserialize_as::<Reading>(
      parse(r#"{"Label":null,"Level":null,"Tag":{},"Taken":"2024-03-05T10:20+01:00"}"#).unwrap(),
    )
    .unwrap();
  assert_eq!(reading.label, None);
  assert_eq!(reading.level, 0);
  assert_eq!(reading.tag, (String::new(), Value::Null));
  assert_eq!(reading.taken, datetime!(2024-03-05 11:20 UTC));
}

#[test]
fn typed_sequences() {
  use crate::{parse, to_json, fixtures::*};

  let catalog = catalog();
  let matcher = Matcher::new(&catalog);

  let polygon = Polygon {
    points: vec![Point { x: 1, y: 2 }, Point { x: -3, y: 4 }, Point::default()],
    weights: vec![Some(1), None, Some(255)],
  };
  let serialized = to_json(&polygon).unwrap();
  assert_eq!(matcher.deserialize_as::<Polygon>(parse(&serialized).unwrap()).unwrap(), polygon);

  // Items are coerced as properties are
  let polygon = matcher
    .deserialize_as::<Polygon>(parse(r#"{"Points":[{"Y":1}],"Weights":[300,null]}"#).unwrap())
    .unwrap();
  assert_eq!(polygon.points, [Point { x: 0, y: 1 }]);
  assert_eq!(polygon.weights, [Some(44), None]);

  let failure = |text: &str| matcher.deserialize_str(text).unwrap_err();
  assert_eq!(
    failure(r#"{"Points":[{"Radius":1}]}"#),
    DeserializeError::PropertyCoercion {
      type_name: "fixtures::Polygon",
      property: "Points",
      expected: "fixtures::Point",
      found: "fixtures::Circle",
    }
  );
  assert_eq!(
    failure(r#"{"Points":[1]}"#),
    DeserializeError::PropertyCoercion {
      type_name: "fixtures::Polygon",
      property: "Points",
      expected: "fixtures::Point",
      found: "number",
    }
  );
  // `Point` has no representation of `null`
  assert_eq!(
    failure(r#"{"Points":[null]}"#),
    DeserializeError::PropertyCoercion {
      type_name: "fixtures::Polygon",
      property: "Points",
      expected: "Sequence",
      found: "array",
    }
  );
}

#[test]
fn failures() {
  use crate::{JsonError, parse, fixtures::*};

  let catalog = catalog();
  let matcher = Matcher::new(&catalog);

  assert_eq!(matcher.deserialize_str("[]").unwrap_err(), DeserializeError::NotAnObject);
  assert_eq!(matcher.deserialize_str(r#"{"Q":1}"#).unwrap_err(), DeserializeError::NoMatch);
  assert!(matches!(
    matcher.deserialize_str(r#"{"a":}"#).unwrap_err(),
    DeserializeError::Json(JsonError::Malformed { .. })
  ));
  assert_eq!(
    matcher.deserialize_str(r#"{"X":"1","Y":2}"#).unwrap_err(),
    DeserializeError::PropertyCoercion {
      type_name: "fixtures::Point",
      property: "X",
      expected: "i32",
      found: "string",
    }
  );
  assert_eq!(
    matcher.deserialize_str(r#"{"Id":"not a guid","Taken":"2024-03-05"}"#).unwrap_err(),
    DeserializeError::PropertyCoercion {
      type_name: "fixtures::Reading",
      property: "Id",
      expected: "Guid",
      found: "string",
    }
  );
  assert_eq!(
    matcher.deserialize_str(r#"{"Start":{"Y":1,"Radius":2},"End":{}}"#).unwrap_err(),
    DeserializeError::PropertyCoercion {
      type_name: "fixtures::Line",
      property: "Start",
      expected: "fixtures::Point",
      found: "fixtures::Circle",
    }
  );
  assert_eq!(
    matcher.deserialize_as::<Point>(parse(r#"{"Radius":1}"#).unwrap()).unwrap_err(),
    DeserializeError::UnexpectedType { expected: "fixtures::Point", found: "fixtures::Circle" }
  );

  let shallow = Matcher::new(&catalog).with_parser(Parser::new().with_max_depth(1));
  assert_eq!(
    shallow.deserialize_str(r#"{"Start":{"X":1,"Y":2}}"#).unwrap_err(),
    DeserializeError::Json(JsonError::DepthLimitExceeded)
  );
}
