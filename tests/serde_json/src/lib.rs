use shape_json::{Number, Value};

pub fn check_float(number: f64, expected: f64) {
  // 0.1% of the smaller number
  let allowed_deviation = number.min(expected).abs() / 1000.0;
  assert!((number - expected).abs() <= allowed_deviation, "{number} != {expected}");
}

/// Check a value parsed by `shape-json` is the value `serde_json` serialized.
///
/// Integers must be exact and of the same sign. Floats must be within a tolerance.
pub fn check_value(value: &Value, expected: &serde_json::Value) {
  match expected {
    serde_json::Value::Null => assert!(value.is_null()),
    serde_json::Value::Bool(expected) => assert_eq!(value.as_bool(), Some(*expected)),
    serde_json::Value::Number(expected) => {
      let number = value.as_number().unwrap();
      if let Some(expected) = expected.as_u64() {
        assert_eq!(number, Number::Unsigned(expected));
      } else if let Some(expected) = expected.as_i64() {
        assert!(matches!(number, Number::Signed(_)));
        assert_eq!(number, Number::Signed(expected));
      } else {
        assert!(!number.is_integer());
        check_float(number.as_f64(), expected.as_f64().unwrap());
      }
    }
    serde_json::Value::String(expected) => assert_eq!(value.as_str(), Some(expected.as_str())),
    serde_json::Value::Array(expected) => {
      let array = value.as_array().unwrap();
      assert_eq!(array.len(), expected.len());
      for (value, expected) in array.iter().zip(expected) {
        check_value(value, expected);
      }
    }
    serde_json::Value::Object(expected) => {
      let object = value.as_object().unwrap();
      assert_eq!(object.len(), expected.len());
      for (key, expected) in expected {
        check_value(object.get(key).unwrap(), expected);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use rand_core::{RngCore, OsRng};
  use super::*;

  #[allow(clippy::cast_possible_truncation)]
  fn random_string() -> String {
    let mut res = String::new();
    for _ in 0 .. (OsRng.next_u64() % 128) {
      if (OsRng.next_u64() % 2) == 1 {
        // ASCII, including control characters
        res.push(char::from_u32((OsRng.next_u64() % 128) as u32).unwrap());
      } else {
        // Unicode
        res.push(loop {
          if let Some(char) = char::from_u32(OsRng.next_u64() as u32) {
            // Skip ASCII as those are intended to be included by the other branch
            if char.is_ascii() {
              continue;
            }
            break char;
          }
        });
      }
    }
    res
  }

  fn random_value(depth: usize) -> serde_json::Value {
    use serde_json::Value;

    let modulus = if depth == 8 { 4 } else { 6 };
    match OsRng.next_u64() % modulus {
      0 => Value::Null,
      1 => Value::Bool((OsRng.next_u64() % 2) == 1),
      2 => Value::Number(match OsRng.next_u64() % 3 {
        0 => serde_json::Number::from(OsRng.next_u64()),
        1 => serde_json::Number::from(-i64::try_from(OsRng.next_u64() >> 1).unwrap()),
        2 => loop {
          if let Some(float) = serde_json::Number::from_f64(f64::from_bits(OsRng.next_u64())) {
            break float;
          }
        },
        _ => unreachable!(),
      }),
      3 => Value::String(random_string()),
      4 => Value::Array({
        let mut res = vec![];
        for _ in 0 .. (OsRng.next_u64() % 8) {
          res.push(random_value(depth + 1));
        }
        res
      }),
      5 => Value::Object({
        let mut res = serde_json::Map::new();
        for _ in 0 .. (OsRng.next_u64() % 8) {
          res.insert(random_string(), random_value(depth + 1));
        }
        res
      }),
      _ => unreachable!(),
    }
  }

  // Compare two `serde_json` values, with a tolerance for floats
  fn check_values_equivalent(a: &serde_json::Value, b: &serde_json::Value) {
    use serde_json::Value;

    match a {
      Value::Null | Value::Bool(_) | Value::String(_) => assert_eq!(a, b),
      Value::Number(number) => {
        if number.is_f64() {
          check_float(number.as_f64().unwrap(), b.as_f64().unwrap());
        } else {
          assert_eq!(a, b);
        }
      }
      Value::Array(array) => {
        let b = b.as_array().unwrap();
        assert_eq!(array.len(), b.len());
        for (a, b) in array.iter().zip(b) {
          check_values_equivalent(a, b);
        }
      }
      Value::Object(object) => {
        let b = b.as_object().unwrap();
        assert_eq!(object.len(), b.len());
        for (key, value) in object {
          check_values_equivalent(value, &b[key]);
        }
      }
    }
  }

  #[test]
  fn fuzz() {
    for i in 0 .. 100 {
      dbg!(i);
      let expected = dbg!(loop {
        let value = random_value(0);
        if matches!(value, serde_json::Value::Object(_) | serde_json::Value::Array(_)) {
          break value;
        }
      });

      // Parse what `serde_json` serialized
      let serialization = expected.to_string();
      let value = shape_json::parse(&serialization).unwrap();
      check_value(&value, &expected);
      assert_eq!(shape_json::parse_bytes(serialization.as_bytes()).unwrap(), value);

      // Have `serde_json` parse what we serialized
      let reserialization = shape_json::serialize(&value).unwrap();
      assert!(reserialization.is_ascii());
      check_values_equivalent(&expected, &serde_json::from_str(&reserialization).unwrap());

      // Our own serialization round-trips exactly
      assert_eq!(shape_json::parse(&reserialization).unwrap(), value);
      assert_eq!(shape_json_traits::to_json(&value).unwrap(), reserialization);
    }
  }

  #[test]
  fn malformed() {
    for invalid in [
      "",
      "{",
      "[1,]",
      r#"{"a":}"#,
      r#"{"a" 1}"#,
      r#"{"a":1,}"#,
      "{1:2}",
      "[1 2]",
      "[true false]",
      "tru",
      "nul",
      "1-2",
      "1 2",
      r#""abc"#,
      r#""\x""#,
      r#""\u12""#,
    ] {
      assert!(serde_json::from_str::<serde_json::Value>(invalid).is_err(), "{invalid}");
      let err = shape_json::parse(invalid).unwrap_err();
      assert!(err.is_malformed(), "{invalid}: {err}");
    }
  }

  #[test]
  fn escapes() {
    let text = r#"["A", "é", "\u00e9", "\ud83d\ude00", "\"\\\/\b\f\n\r\t", "\u0000"]"#;
    let expected = serde_json::from_str::<serde_json::Value>(text).unwrap();
    let value = shape_json::parse(text).unwrap();
    check_value(&value, &expected);
    assert_eq!(
      shape_json::serialize(&value).unwrap(),
      r#"["A","\u00e9","\u00e9","\ud83d\ude00","\"\\/\b\f\n\r\t","\u0000"]"#
    );
  }
}
