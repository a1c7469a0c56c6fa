use crate::{JsonError, Value, PropertyType, PropertyValue, OnUnsupported, Field};

impl Field for String {
  const PROPERTY_TYPE: PropertyType = PropertyType::String;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(Value::String(self.clone()))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::String(value) => Some(value),
      _ => None,
    }
  }
}

#[test]
fn string() {
  assert_eq!(crate::to_json(&String::new()).unwrap(), r#""""#);
  assert_eq!(crate::to_json(&"a\nb".to_string()).unwrap(), r#""a\nb""#);
  assert_eq!(
    String::from_property(PropertyValue::String("x".to_string())),
    Some("x".to_string())
  );
  assert_eq!(String::from_property(PropertyValue::Bool(true)), None);
}
