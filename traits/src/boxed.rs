use crate::{JsonError, Value, PropertyType, PropertyValue, OnUnsupported, Field};

impl<T: Field> Field for Box<T> {
  const PROPERTY_TYPE: PropertyType = T::PROPERTY_TYPE;
  fn to_value(&self, on_unsupported: OnUnsupported) -> Result<Value, JsonError> {
    T::to_value(self, on_unsupported)
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    T::from_property(value).map(Box::new)
  }
}
