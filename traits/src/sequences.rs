use crate::{JsonError, Value, PropertyType, PropertyValue, OnUnsupported, Field};

fn items_to_value<T: Field>(
  items: &[T],
  on_unsupported: OnUnsupported,
) -> Result<Value, JsonError> {
  items.iter().map(|item| item.to_value(on_unsupported)).collect::<Result<_, _>>().map(Value::Array)
}

impl<T: Field> Field for Vec<T> {
  const PROPERTY_TYPE: PropertyType = PropertyType::Sequence(&T::PROPERTY_TYPE);
  fn to_value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError> {
    items_to_value(self, on_unsupported)
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Sequence(items) => items.into_iter().map(T::from_property).collect(),
      _ => None,
    }
  }
}

/// Arrays are only recovered from sequences of exactly `N` items.
impl<T: Field, const N: usize> Field for [T; N] {
  const PROPERTY_TYPE: PropertyType = PropertyType::Sequence(&T::PROPERTY_TYPE);
  fn to_value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError> {
    items_to_value(self, on_unsupported)
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    Vec::<T>::from_property(value)?.try_into().ok()
  }
}

#[test]
fn sequence() {
  let values = vec![Value::Null, Value::from(1u64), Value::from("a")];
  assert_eq!(crate::to_json(&values).unwrap(), r#"[null,1,"a"]"#);
  assert_eq!(<Vec<Value> as Field>::PROPERTY_TYPE, PropertyType::Sequence(&PropertyType::Value));
  let coerced = || values.iter().cloned().map(PropertyValue::Value).collect::<Vec<_>>();
  let recovered = Vec::<Value>::from_property(PropertyValue::Sequence(coerced()));
  assert_eq!(recovered, Some(values.clone()));
  assert_eq!(Vec::<Value>::from_property(PropertyValue::Null), None);
  assert_eq!(Vec::<u16>::from_property(PropertyValue::Sequence(coerced())), None);

  assert_eq!(crate::to_json(&vec![Some(1u8), None]).unwrap(), "[1,null]");
  assert_eq!(crate::to_json(&Vec::<u8>::new()).unwrap(), "[]");
  assert_eq!(
    crate::to_json(&vec![1.0, f64::NAN]),
    Err(JsonError::UnsupportedValue("non-finite float"))
  );
}

#[test]
fn array() {
  assert_eq!(crate::to_json(&[[1u8, 2], [3, 4]]).unwrap(), "[[1,2],[3,4]]");
  assert_eq!(
    <[[u8; 2]; 2] as Field>::PROPERTY_TYPE,
    PropertyType::Sequence(&PropertyType::Sequence(&PropertyType::U8))
  );
  let items = |len: u8| PropertyValue::Sequence((0 .. len).map(PropertyValue::U8).collect());
  assert_eq!(<[u8; 3]>::from_property(items(3)), Some([0, 1, 2]));
  assert_eq!(<[u8; 3]>::from_property(items(2)), None);
  assert_eq!(<[u8; 3]>::from_property(items(4)), None);
}
