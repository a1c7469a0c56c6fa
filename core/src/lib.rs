#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod value;
mod lexer;
mod parser;
mod serializer;

pub use value::{Number, Map, Value};
pub use parser::{Parser, parse, parse_bytes};
pub use serializer::{serialize, serialize_into, write_str};

/// Why a serialization was rejected as malformed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Malformed {
  /// The input ended while a value was still expected.
  UnexpectedEnd,
  /// A token appeared where it isn't allowed.
  UnexpectedToken,
  /// An object had a key which wasn't a string.
  InvalidKey,
  /// The JSON had an invalid delimiter between the key and value (`:` expected).
  InvalidKeyValueDelimiter,
  /// A string had an unknown, truncated, or unrepresentable escape sequence.
  InvalidEscape,
  /// A number couldn't be decoded.
  InvalidNumber,
  /// A string was never closed.
  UnterminatedString,
  /// Non-whitespace characters followed the top-level value.
  TrailingCharacters,
  /// The bytes weren't valid UTF-8.
  InvalidUtf8,
}

/// An error incurred when parsing or serializing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JsonError {
  /// The JSON was malformed.
  Malformed {
    /// The byte offset within the input at which the problem was detected.
    offset: usize,
    /// What was wrong.
    reason: Malformed,
  },
  /// The configured nesting depth was exceeded.
  DepthLimitExceeded,
  /// A value couldn't be represented within JSON.
  UnsupportedValue(&'static str),
  /// The writer being serialized into failed.
  WriteFailed,
}

impl JsonError {
  /// If this error was due to malformed input.
  #[inline(always)]
  pub fn is_malformed(&self) -> bool {
    matches!(self, JsonError::Malformed { .. })
  }
}

impl core::fmt::Display for JsonError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      JsonError::Malformed { offset, reason } => {
        write!(f, "malformed JSON at byte {offset}: {reason:?}")
      }
      JsonError::DepthLimitExceeded => f.write_str("nesting depth limit exceeded"),
      JsonError::UnsupportedValue(kind) => write!(f, "value of kind `{kind}` isn't representable"),
      JsonError::WriteFailed => f.write_str("writer failed"),
    }
  }
}

impl core::error::Error for JsonError {}
