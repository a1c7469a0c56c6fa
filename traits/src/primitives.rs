use crate::{JsonError, Number, Value, PropertyType, PropertyValue, OnUnsupported, Field};

macro_rules! integer {
  ($widen: ident, $number: ident, $($ty: ty => $variant: ident,)*) => {
    $(
      impl Field for $ty {
        const PROPERTY_TYPE: PropertyType = PropertyType::$variant;
        fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
          Ok(Value::Number(Number::$number($widen::from(*self))))
        }
        fn from_property(value: PropertyValue) -> Option<Self> {
          match value {
            PropertyValue::$variant(value) => Some(value),
            _ => None,
          }
        }
      }
    )*
  };
}

integer!(i64, Signed, i8 => I8, i16 => I16, i32 => I32, i64 => I64,);
integer!(u64, Unsigned, u8 => U8, u16 => U16, u32 => U32, u64 => U64,);

macro_rules! float {
  ($($ty: ty => $variant: ident,)*) => {
    $(
      impl Field for $ty {
        const PROPERTY_TYPE: PropertyType = PropertyType::$variant;
        fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
          if !self.is_finite() {
            Err(JsonError::UnsupportedValue("non-finite float"))?;
          }
          Ok(Value::Number(Number::Float(f64::from(*self))))
        }
        fn from_property(value: PropertyValue) -> Option<Self> {
          match value {
            PropertyValue::$variant(value) => Some(value),
            _ => None,
          }
        }
      }
    )*
  };
}

float!(f32 => F32, f64 => F64,);

impl Field for bool {
  const PROPERTY_TYPE: PropertyType = PropertyType::Bool;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(Value::Bool(*self))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Bool(value) => Some(value),
      _ => None,
    }
  }
}

#[test]
fn primitives() {
  assert_eq!(crate::to_json(&-5i8).unwrap(), "-5");
  assert_eq!(crate::to_json(&u64::MAX).unwrap(), "18446744073709551615");
  assert_eq!(crate::to_json(&true).unwrap(), "true");
  assert_eq!(crate::to_json(&0.5f32).unwrap(), "0.5");
  assert_eq!(crate::to_json(&f64::NAN), Err(JsonError::UnsupportedValue("non-finite float")));

  assert_eq!(u8::from_property(PropertyValue::U8(44)), Some(44));
  assert_eq!(u8::from_property(PropertyValue::U16(44)), None);
  assert_eq!(u8::from_property(PropertyValue::Null), None);
}
