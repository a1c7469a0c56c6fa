use crate::{JsonError, Value, PropertyType, PropertyValue, OnUnsupported, Field};

impl<T: Field> Field for Option<T> {
  const PROPERTY_TYPE: PropertyType = T::PROPERTY_TYPE;
  /// This will serialize `Some(value)` as `value` and `None` as `null`.
  fn to_value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError> {
    match self {
      Some(value) => value.to_value(on_unsupported),
      None => Ok(Value::Null),
    }
  }
  /// This will accept `null` as a representation of `None`.
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Null => Some(None),
      value => T::from_property(value).map(Some),
    }
  }
}

#[test]
fn option() {
  assert_eq!(crate::to_json(&Option::<u16>::None).unwrap(), "null");
  assert_eq!(crate::to_json(&Some(3u16)).unwrap(), "3");
  assert_eq!(<Option<u16> as Field>::PROPERTY_TYPE, PropertyType::U16);
  assert_eq!(Option::<u16>::from_property(PropertyValue::U16(3)), Some(Some(3)));
  assert_eq!(Option::<u16>::from_property(PropertyValue::Null), Some(None));
  assert_eq!(Option::<u16>::from_property(PropertyValue::U8(3)), None);
}
