#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;
use alloc::vec::Vec;

use shape_json::{JsonError, Value, parse_bytes, serialize_into};
use embedded_io::{Read, Write};

/// An error incurred when reading a value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReadError<E> {
  /// The reader failed.
  Io(E),
  /// The stream was longer than the maximum length allowed.
  TooLarge,
  /// The stream wasn't valid JSON.
  Json(JsonError),
}

impl<E: core::fmt::Debug> core::fmt::Display for ReadError<E> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      ReadError::Io(e) => write!(f, "reader failed: {e:?}"),
      ReadError::TooLarge => f.write_str("stream exceeded the maximum length"),
      ReadError::Json(e) => write!(f, "invalid JSON: {e}"),
    }
  }
}

impl<E: core::fmt::Debug> core::error::Error for ReadError<E> {}

/// An error incurred when writing a value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WriteError<E> {
  /// The writer failed.
  Io(E),
  /// The value couldn't be serialized.
  Json(JsonError),
}

impl<E: core::fmt::Debug> core::fmt::Display for WriteError<E> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      WriteError::Io(e) => write!(f, "writer failed: {e:?}"),
      WriteError::Json(e) => write!(f, "couldn't serialize: {e}"),
    }
  }
}

impl<E: core::fmt::Debug> core::error::Error for WriteError<E> {}

/// Read a stream to its end, then parse it.
///
/// Streams longer than `max_len` bytes are rejected without being read further.
pub fn read_value<R: Read>(reader: &mut R, max_len: usize) -> Result<Value, ReadError<R::Error>> {
  let mut buf = Vec::new();
  let mut chunk = [0; 64];
  loop {
    let read = reader.read(&mut chunk).map_err(ReadError::Io)?;
    if read == 0 {
      break;
    }
    if (buf.len() + read) > max_len {
      log::debug!("rejecting stream longer than {max_len} bytes");
      Err(ReadError::TooLarge)?;
    }
    buf.extend_from_slice(&chunk[.. read]);
  }
  parse_bytes(&buf).map_err(ReadError::Json)
}

// An adapter from `embedded_io::Write` to `core::fmt::Write`, retaining the first error.
struct FmtAdapter<'w, W: Write> {
  writer: &'w mut W,
  error: Option<W::Error>,
}

impl<W: Write> core::fmt::Write for FmtAdapter<'_, W> {
  fn write_str(&mut self, s: &str) -> core::fmt::Result {
    self.writer.write_all(s.as_bytes()).map_err(|e| {
      self.error = Some(e);
      core::fmt::Error
    })
  }
}

/// Serialize a value into a writer, flushing it afterwards.
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<(), WriteError<W::Error>> {
  let mut adapter = FmtAdapter { writer, error: None };
  match serialize_into(value, &mut adapter) {
    Ok(()) => {}
    Err(JsonError::WriteFailed) => match adapter.error {
      Some(e) => Err(WriteError::Io(e))?,
      None => Err(WriteError::Json(JsonError::WriteFailed))?,
    },
    Err(e) => Err(WriteError::Json(e))?,
  }
  adapter.writer.flush().map_err(WriteError::Io)
}

#[cfg(test)]
struct Sink {
  written: Vec<u8>,
  capacity: usize,
}

#[cfg(test)]
impl embedded_io::ErrorType for Sink {
  type Error = embedded_io::ErrorKind;
}

#[cfg(test)]
impl Write for Sink {
  fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
    let len = buf.len().min(self.capacity - self.written.len());
    if (len == 0) && !buf.is_empty() {
      Err(embedded_io::ErrorKind::OutOfMemory)?;
    }
    self.written.extend_from_slice(&buf[.. len]);
    Ok(len)
  }
  fn flush(&mut self) -> Result<(), Self::Error> {
    Ok(())
  }
}

#[test]
fn test_read() {
  const SERIALIZATION: &[u8] = br#"{ "hello": "goodbye", "list": [1, 2.5, null] }"#;

  let value = read_value(&mut { SERIALIZATION }, 1024).unwrap();
  assert_eq!(value.get("hello"), Some(&Value::from("goodbye")));
  assert_eq!(value.get("list").and_then(Value::as_array).map(<[Value]>::len), Some(3));

  assert_eq!(
    read_value(&mut { SERIALIZATION }, SERIALIZATION.len() - 1),
    Err(ReadError::TooLarge)
  );
  assert!(matches!(
    read_value(&mut { &SERIALIZATION[.. 20] }, 1024),
    Err(ReadError::Json(JsonError::Malformed { .. }))
  ));
  assert!(matches!(
    read_value(&mut { b"\xff".as_slice() }, 1024),
    Err(ReadError::Json(JsonError::Malformed { offset: 0, .. }))
  ));
}

#[test]
fn test_write() {
  let value = shape_json::parse(r#"{"hello": ["goodbye", 1]}"#).unwrap();

  let mut sink = Sink { written: vec![], capacity: 1024 };
  write_value(&mut sink, &value).unwrap();
  assert_eq!(sink.written, br#"{"hello":["goodbye",1]}"#);

  let mut sink = Sink { written: vec![], capacity: 4 };
  assert_eq!(
    write_value(&mut sink, &value),
    Err(WriteError::Io(embedded_io::ErrorKind::OutOfMemory))
  );

  let mut sink = Sink { written: vec![], capacity: 1024 };
  assert_eq!(
    write_value(&mut sink, &Value::from(f64::NAN)),
    Err(WriteError::Json(JsonError::UnsupportedValue("non-finite float")))
  );
}
