use alloc::string::String;
use core::fmt::Write;

use crate::{Number, JsonError, Value};

#[inline(always)]
fn write(writer: &mut impl Write, str: &str) -> Result<(), JsonError> {
  writer.write_str(str).map_err(|_| JsonError::WriteFailed)
}

/// Write a string as a quoted, escaped JSON string.
///
/// Every character outside of printable ASCII is escaped with `\u`, yielding ASCII output.
pub fn write_str(string: &str, writer: &mut impl Write) -> Result<(), JsonError> {
  write(writer, "\"")?;
  for c in string.chars() {
    match c {
      '"' => write(writer, "\\\"")?,
      '\\' => write(writer, "\\\\")?,
      '\x08' => write(writer, "\\b")?,
      '\x0c' => write(writer, "\\f")?,
      '\n' => write(writer, "\\n")?,
      '\r' => write(writer, "\\r")?,
      '\t' => write(writer, "\\t")?,
      '\x20' ..= '\x7e' => writer.write_char(c).map_err(|_| JsonError::WriteFailed)?,
      // Characters beyond the BMP are written as their UTF-16 surrogate pair
      _ => {
        let mut utf16 = [0; 2];
        for unit in c.encode_utf16(&mut utf16) {
          write!(writer, "\\u{unit:04x}").map_err(|_| JsonError::WriteFailed)?;
        }
      }
    }
  }
  write(writer, "\"")
}

fn write_number(number: Number, writer: &mut impl Write) -> Result<(), JsonError> {
  let res = match number {
    Number::Unsigned(value) => write!(writer, "{value}"),
    Number::Signed(value) => write!(writer, "{value}"),
    Number::Float(value) => {
      if !value.is_finite() {
        Err(JsonError::UnsupportedValue("non-finite float"))?;
      }
      #[cfg(feature = "zmij")]
      {
        let mut buffer = zmij::Buffer::new();
        writer.write_str(buffer.format_finite(value))
      }
      // `Debug` yields the shortest representation which round-trips, with `1.0` for integers
      #[cfg(not(feature = "zmij"))]
      {
        write!(writer, "{value:?}")
      }
    }
  };
  res.map_err(|_| JsonError::WriteFailed)
}

/// Serialize a `Value` into a writer.
///
/// No insignificant whitespace is written. Objects are written in their insertion order.
pub fn serialize_into(value: &Value, writer: &mut impl Write) -> Result<(), JsonError> {
  match value {
    Value::Null => write(writer, "null"),
    Value::Bool(true) => write(writer, "true"),
    Value::Bool(false) => write(writer, "false"),
    Value::Number(number) => write_number(*number, writer),
    Value::String(string) => write_str(string, writer),
    Value::Array(values) => {
      write(writer, "[")?;
      for (i, value) in values.iter().enumerate() {
        if i != 0 {
          write(writer, ",")?;
        }
        serialize_into(value, writer)?;
      }
      write(writer, "]")
    }
    Value::Object(map) => {
      write(writer, "{")?;
      for (i, (key, value)) in map.iter().enumerate() {
        if i != 0 {
          write(writer, ",")?;
        }
        write_str(key, writer)?;
        write(writer, ":")?;
        serialize_into(value, writer)?;
      }
      write(writer, "}")
    }
  }
}

/// Serialize a `Value` into a `String`.
pub fn serialize(value: &Value) -> Result<String, JsonError> {
  let mut res = String::new();
  serialize_into(value, &mut res)?;
  Ok(res)
}

#[test]
fn compact() {
  use crate::{Map, parse};

  let mut point = Map::new();
  point.insert("X", Value::from(1u64));
  point.insert("Y", Value::from(-2i64));
  let value = Value::Array(alloc::vec![
    Value::Object(point),
    Value::Null,
    Value::Bool(true),
    Value::from(1.0),
    Value::from(0.25),
    Value::from("a\"b"),
  ]);
  let serialized = serialize(&value).unwrap();
  assert_eq!(serialized, r#"[{"X":1,"Y":-2},null,true,1.0,0.25,"a\"b"]"#);
  assert_eq!(parse(&serialized).unwrap(), value);
}

#[test]
fn escapes() {
  let escaped = |string: &str| serialize(&Value::from(string)).unwrap();
  assert_eq!(escaped("\\/\x08\x0c\n\r\t"), r#""\\/\b\f\n\r\t""#);
  assert_eq!(escaped("é"), r#""\u00e9""#);
  assert_eq!(escaped("\x01\x7f"), r#""\u0001\u007f""#);
  assert_eq!(escaped("\u{1f600}"), r#""\ud83d\ude00""#);

  for string in ["", "plain", "é", "\u{1f600}", "\u{ffff}", "\0"] {
    assert_eq!(crate::parse(&escaped(string)).unwrap(), Value::from(string));
  }
}

#[test]
fn floats() {
  for float in [0.1, -0.0, 1e100, 5e-324, f64::MAX, f64::MIN_POSITIVE, 123456.789] {
    let serialized = serialize(&Value::from(float)).unwrap();
    assert_eq!(crate::parse(&serialized).unwrap(), Value::from(float), "{serialized}");
  }
  for float in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
    assert_eq!(
      serialize(&Value::from(float)),
      Err(JsonError::UnsupportedValue("non-finite float"))
    );
  }
}
