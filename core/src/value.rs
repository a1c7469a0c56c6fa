use alloc::{string::String, vec::Vec, collections::BTreeMap};

/// A JSON number, held as the widest lossless representation encountered.
///
/// Integers without a sign are held as `Unsigned`, integers with a sign as `Signed`, and anything
/// with a fraction or an exponent as `Float`. Consumers narrow these to the width they need.
#[derive(Clone, Copy, Debug)]
pub enum Number {
  /// An integer written without a sign (or with a leading `+`).
  Unsigned(u64),
  /// An integer written with a sign.
  Signed(i64),
  /// A number written with a fraction or an exponent, or too large for a 64-bit integer.
  Float(f64),
}

impl Number {
  /// The value of this number if it's an integer.
  #[inline(always)]
  fn integer(&self) -> Option<i128> {
    match self {
      Number::Unsigned(value) => Some(i128::from(*value)),
      Number::Signed(value) => Some(i128::from(*value)),
      Number::Float(_) => None,
    }
  }

  /// If this number is an integer.
  pub fn is_integer(&self) -> bool {
    !matches!(self, Number::Float(_))
  }

  /// This number as a `u64`, if it's an integer representable as one.
  pub fn as_u64(&self) -> Option<u64> {
    self.integer().and_then(|value| u64::try_from(value).ok())
  }

  /// This number as an `i64`, if it's an integer representable as one.
  pub fn as_i64(&self) -> Option<i64> {
    self.integer().and_then(|value| i64::try_from(value).ok())
  }

  /// This number as an `f64`.
  ///
  /// Integers beyond 2**53 will be rounded.
  #[allow(clippy::cast_precision_loss)]
  pub fn as_f64(&self) -> f64 {
    match self {
      Number::Unsigned(value) => *value as f64,
      Number::Signed(value) => *value as f64,
      Number::Float(value) => *value,
    }
  }
}

// Integers compare by value regardless of signedness, yet never equal a float
impl PartialEq for Number {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
      _ => match (self.integer(), other.integer()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
      },
    }
  }
}

/// An ordered mapping of keys to values.
///
/// Keys are unique. Inserting an existing key replaces its value where it stands, so the order of
/// first insertion is what's preserved when serializing. Lookups are logarithmic in the amount of
/// entries, while removals shift every later entry.
#[derive(Clone, Default)]
pub struct Map {
  entries: Vec<(String, Value)>,
  index: BTreeMap<String, usize>,
}

impl Map {
  /// Create an empty map.
  pub fn new() -> Self {
    Self { entries: Vec::new(), index: BTreeMap::new() }
  }

  /// The amount of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// If there are no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[inline(always)]
  fn position(&self, key: &str) -> Option<usize> {
    self.index.get(key).copied()
  }

  /// Insert a value, returning the value it replaced (if one was present).
  pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
    let key = key.into();
    match self.position(&key) {
      Some(i) => Some(core::mem::replace(&mut self.entries[i].1, value)),
      None => {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
      }
    }
  }

  /// Fetch the value for a key.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.position(key).map(|i| &self.entries[i].1)
  }

  /// Fetch the value for a key, mutably.
  pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
    self.position(key).map(|i| &mut self.entries[i].1)
  }

  /// If this map has an entry for this key.
  pub fn contains_key(&self, key: &str) -> bool {
    self.index.contains_key(key)
  }

  /// Remove the entry for a key, returning its value.
  ///
  /// The order of the remaining entries is preserved.
  pub fn remove(&mut self, key: &str) -> Option<Value> {
    let i = self.index.remove(key)?;
    for later in self.index.values_mut() {
      if *later > i {
        *later -= 1;
      }
    }
    Some(self.entries.remove(i).1)
  }

  /// The first entry inserted.
  pub fn first(&self) -> Option<(&str, &Value)> {
    self.entries.first().map(|(key, value)| (key.as_str(), value))
  }

  /// Iterate over the entries in order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.entries.iter().map(|(key, value)| (key.as_str(), value))
  }

  /// Iterate over the keys in order.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(key, _)| key.as_str())
  }
}

impl core::fmt::Debug for Map {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}

// Order is irrelevant to a mapping's identity
impl PartialEq for Map {
  fn eq(&self, other: &Self) -> bool {
    (self.len() == other.len()) &&
      self.iter().all(|(key, value)| other.get(key).is_some_and(|other| other == value))
  }
}

impl IntoIterator for Map {
  type Item = (String, Value);
  type IntoIter = alloc::vec::IntoIter<(String, Value)>;
  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
  fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
    let mut map = Map::new();
    for (key, value) in iter {
      map.insert(key, value);
    }
    map
  }
}

/// A JSON value.
///
/// https://datatracker.ietf.org/doc/html/rfc8259#section-3 defines all possible values.
#[derive(Clone, PartialEq, Default, Debug)]
pub enum Value {
  /// The `null` unit value.
  #[default]
  Null,
  /// A boolean.
  Bool(bool),
  /// A number.
  Number(Number),
  /// A string.
  String(String),
  /// An ordered sequence of values.
  Array(Vec<Value>),
  /// A mapping of keys to values.
  Object(Map),
}

impl Value {
  /// If this is `null`.
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// The boolean, if this is one.
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(value) => Some(*value),
      _ => None,
    }
  }

  /// The number, if this is one.
  pub fn as_number(&self) -> Option<Number> {
    match self {
      Value::Number(value) => Some(*value),
      _ => None,
    }
  }

  /// The string, if this is one.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(value) => Some(value),
      _ => None,
    }
  }

  /// The array, if this is one.
  pub fn as_array(&self) -> Option<&[Value]> {
    match self {
      Value::Array(values) => Some(values),
      _ => None,
    }
  }

  /// The object, if this is one.
  pub fn as_object(&self) -> Option<&Map> {
    match self {
      Value::Object(map) => Some(map),
      _ => None,
    }
  }

  /// Get a field from an object by key.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.as_object().and_then(|map| map.get(key))
  }

  /// The name of this value's kind, for error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Array(_) => "array",
      Value::Object(_) => "object",
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}
impl From<u64> for Value {
  fn from(value: u64) -> Self {
    Value::Number(Number::Unsigned(value))
  }
}
impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Number(Number::Signed(value))
  }
}
impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(Number::Float(value))
  }
}
impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.into())
  }
}
impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value)
  }
}
impl From<Vec<Value>> for Value {
  fn from(values: Vec<Value>) -> Self {
    Value::Array(values)
  }
}
impl From<Map> for Value {
  fn from(map: Map) -> Self {
    Value::Object(map)
  }
}

#[test]
fn number_equality() {
  assert_eq!(Number::Signed(5), Number::Unsigned(5));
  assert_ne!(Number::Signed(-1), Number::Unsigned(u64::MAX));
  assert_ne!(Number::Unsigned(1), Number::Float(1.0));
  assert_eq!(Number::Float(0.5), Number::Float(0.5));
  assert_eq!(Number::Signed(-3).as_u64(), None);
  assert_eq!(Number::Unsigned(u64::MAX).as_i64(), None);
}

#[test]
fn map_overwrites_in_place() {
  let mut map = Map::new();
  assert!(map.insert("a", Value::from(1u64)).is_none());
  map.insert("b", Value::from(2u64));
  assert_eq!(map.insert("a", Value::from(3u64)), Some(Value::from(1u64)));
  assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b"]);
  assert_eq!(map.get("a"), Some(&Value::from(3u64)));
  assert_eq!(map.first().map(|(key, _)| key), Some("a"));

  assert_eq!(map.remove("a"), Some(Value::from(3u64)));
  assert_eq!(map.len(), 1);
  assert!(!map.contains_key("a"));
  assert_eq!(map.remove("a"), None);
}

#[test]
fn map_removal_keeps_lookups() {
  let mut map = (0 .. 8u64).map(|i| (alloc::format!("{i}"), Value::from(i))).collect::<Map>();
  assert_eq!(map.remove("2"), Some(Value::from(2u64)));
  assert_eq!(map.remove("5"), Some(Value::from(5u64)));
  assert_eq!(map.keys().collect::<Vec<_>>(), ["0", "1", "3", "4", "6", "7"]);
  for i in [0u64, 1, 3, 4, 6, 7] {
    assert_eq!(map.get(&alloc::format!("{i}")), Some(&Value::from(i)));
  }
  map.insert("2", Value::Null);
  assert_eq!(map.keys().last(), Some("2"));
  *map.get_mut("7").unwrap() = Value::Bool(true);
  assert_eq!(map.get("7"), Some(&Value::Bool(true)));
}

#[test]
fn wide_objects() {
  let count = 50_000;
  let mut text = String::from("{");
  for i in 0 .. count {
    if i != 0 {
      text.push(',');
    }
    text.push_str(&alloc::format!("\"k{i}\":{i}"));
  }
  text.push('}');

  let value = crate::parse(&text).unwrap();
  let map = value.as_object().unwrap();
  assert_eq!(map.len(), count);
  assert_eq!(map.get("k49999"), Some(&Value::from(49_999u64)));
  assert_eq!(map.first(), Some(("k0", &Value::from(0u64))));
  assert_eq!(&value, &value.clone());
}

#[test]
fn map_equality_ignores_order() {
  let a = [("x", Value::from(1u64)), ("y", Value::Null)].into_iter().collect::<Map>();
  let b = [("y", Value::Null), ("x", Value::from(1i64))].into_iter().collect::<Map>();
  assert_eq!(a, b);
  let c = [("x", Value::from(1u64))].into_iter().collect::<Map>();
  assert_ne!(a, c);
}
