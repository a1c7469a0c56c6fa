use alloc::vec::Vec;

use crate::{
  Malformed, JsonError, Map, Value,
  lexer::{Token, Lexer},
};

#[inline(always)]
fn unexpected(offset: usize, token: &Token) -> JsonError {
  let reason =
    if *token == Token::End { Malformed::UnexpectedEnd } else { Malformed::UnexpectedToken };
  JsonError::Malformed { offset, reason }
}

/// A recursive-descent parser for JSON text.
///
/// The default parser places no bound on how deeply objects and arrays may nest. Hosts parsing
/// untrusted input should bound this with [`Parser::with_max_depth`].
#[derive(Clone, Copy, Default, Debug)]
pub struct Parser {
  max_depth: Option<usize>,
}

impl Parser {
  /// Create a new parser.
  pub const fn new() -> Self {
    Self { max_depth: None }
  }

  /// Bound how many objects/arrays may be nested within each other.
  ///
  /// A depth of `1` allows a single container whose elements are all scalars.
  #[must_use]
  pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = Some(max_depth);
    self
  }

  /// Parse a JSON serialization into a `Value`.
  ///
  /// Only whitespace may follow the top-level value.
  pub fn parse(&self, text: &str) -> Result<Value, JsonError> {
    let mut lexer = Lexer::new(text);
    let value = self.value(&mut lexer, 0)?;
    let (offset, token) = lexer.next_token()?;
    if token != Token::End {
      Err(JsonError::Malformed { offset, reason: Malformed::TrailingCharacters })?;
    }
    Ok(value)
  }

  /// Parse a JSON serialization, first checking it's valid UTF-8.
  pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Value, JsonError> {
    let text = core::str::from_utf8(bytes).map_err(|e| JsonError::Malformed {
      offset: e.valid_up_to(),
      reason: Malformed::InvalidUtf8,
    })?;
    self.parse(text)
  }

  #[inline(always)]
  fn enter(&self, depth: usize) -> Result<usize, JsonError> {
    let depth = depth + 1;
    if self.max_depth.is_some_and(|max_depth| depth > max_depth) {
      Err(JsonError::DepthLimitExceeded)?;
    }
    Ok(depth)
  }

  fn value(&self, lexer: &mut Lexer<'_>, depth: usize) -> Result<Value, JsonError> {
    let (offset, token) = lexer.next_token()?;
    Ok(match token {
      Token::BeginObject => Value::Object(self.object(lexer, self.enter(depth)?)?),
      Token::BeginArray => Value::Array(self.array(lexer, self.enter(depth)?)?),
      Token::String(string) => Value::String(string),
      Token::Number(number) => Value::Number(number),
      Token::True => Value::Bool(true),
      Token::False => Value::Bool(false),
      Token::Null => Value::Null,
      token => Err(unexpected(offset, &token))?,
    })
  }

  fn object(&self, lexer: &mut Lexer<'_>, depth: usize) -> Result<Map, JsonError> {
    let mut map = Map::new();
    if *lexer.look_ahead()? == Token::EndObject {
      lexer.next_token()?;
      return Ok(map);
    }

    loop {
      let key = match lexer.next_token()? {
        (_, Token::String(key)) => key,
        (offset, Token::End) => Err(unexpected(offset, &Token::End))?,
        (offset, _) => Err(JsonError::Malformed { offset, reason: Malformed::InvalidKey })?,
      };
      match lexer.next_token()? {
        (_, Token::Colon) => {}
        (offset, Token::End) => Err(unexpected(offset, &Token::End))?,
        (offset, _) => {
          Err(JsonError::Malformed { offset, reason: Malformed::InvalidKeyValueDelimiter })?
        }
      }
      let value = self.value(lexer, depth)?;
      // Duplicate keys are resolved by the last occurrence
      map.insert(key, value);

      match lexer.next_token()? {
        (_, Token::Comma) => {}
        (_, Token::EndObject) => return Ok(map),
        (offset, token) => Err(unexpected(offset, &token))?,
      }
    }
  }

  fn array(&self, lexer: &mut Lexer<'_>, depth: usize) -> Result<Vec<Value>, JsonError> {
    let mut values = Vec::new();
    if *lexer.look_ahead()? == Token::EndArray {
      lexer.next_token()?;
      return Ok(values);
    }

    loop {
      values.push(self.value(lexer, depth)?);
      match lexer.next_token()? {
        (_, Token::Comma) => {}
        (_, Token::EndArray) => return Ok(values),
        (offset, token) => Err(unexpected(offset, &token))?,
      }
    }
  }
}

/// Parse a JSON serialization into a `Value`.
///
/// This places no bound on the depth of the value. Use [`Parser::with_max_depth`] to do so.
pub fn parse(text: &str) -> Result<Value, JsonError> {
  Parser::new().parse(text)
}

/// Parse a JSON serialization, from bytes which are expected to be UTF-8, into a `Value`.
pub fn parse_bytes(bytes: &[u8]) -> Result<Value, JsonError> {
  Parser::new().parse_bytes(bytes)
}

#[cfg(test)]
fn reason(text: &str) -> Malformed {
  match parse(text) {
    Err(JsonError::Malformed { reason, .. }) => reason,
    other => panic!("`{text}` wasn't malformed: {other:?}"),
  }
}

#[test]
fn duplicate_keys() {
  let value = parse(r#"{"a":1,"b":true,"a":2}"#).unwrap();
  let map = value.as_object().unwrap();
  assert_eq!(map.len(), 2);
  assert_eq!(map.get("a"), Some(&Value::from(2u64)));
  assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn nested() {
  let value = parse(" { \"list\" : [ 1 , -2 , 0.5 , null , \"x\" , { } , [ ] ] }\r\n").unwrap();
  let list = value.get("list").and_then(Value::as_array).unwrap();
  assert_eq!(
    list,
    [
      Value::from(1u64),
      Value::from(-2i64),
      Value::from(0.5),
      Value::Null,
      Value::from("x"),
      Value::Object(Map::new()),
      Value::Array(Vec::new()),
    ]
  );
}

#[test]
fn malformed() {
  assert_eq!(reason(r#"{"a":}"#), Malformed::UnexpectedToken);
  assert_eq!(reason(r#"{"a" 1}"#), Malformed::InvalidKeyValueDelimiter);
  assert_eq!(reason(r#"{1:1}"#), Malformed::InvalidKey);
  assert_eq!(reason(r#"{"a":1,}"#), Malformed::InvalidKey);
  assert_eq!(reason(r#"{"a":1"#), Malformed::UnexpectedEnd);
  assert_eq!(reason(r#"{"a":1 "b":2}"#), Malformed::UnexpectedToken);
  assert_eq!(reason("[1,]"), Malformed::UnexpectedToken);
  assert_eq!(reason("[1 2]"), Malformed::UnexpectedToken);
  assert_eq!(reason("["), Malformed::UnexpectedEnd);
  assert_eq!(reason(""), Malformed::UnexpectedEnd);
  assert_eq!(reason("  "), Malformed::UnexpectedEnd);
  assert_eq!(reason("1 2"), Malformed::TrailingCharacters);
  assert_eq!(reason("{}}"), Malformed::TrailingCharacters);
  assert_eq!(
    parse(r#"{"a":}"#),
    Err(JsonError::Malformed { offset: 5, reason: Malformed::UnexpectedToken })
  );
}

#[test]
fn bytes() {
  assert_eq!(parse_bytes(b"[true]").unwrap(), Value::Array(alloc::vec![Value::Bool(true)]));
  assert_eq!(
    parse_bytes(b"[\"\xff\"]"),
    Err(JsonError::Malformed { offset: 2, reason: Malformed::InvalidUtf8 })
  );
}

#[test]
fn depth_limit() {
  let parser = Parser::new().with_max_depth(2);
  assert!(parser.parse("[[1], {\"a\": 1}]").is_ok());
  assert!(Parser::new().with_max_depth(3).parse("[[1], {\"a\": []}]").is_ok());
  assert_eq!(parser.parse("[[[1]]]"), Err(JsonError::DepthLimitExceeded));
  assert_eq!(parser.parse(r#"{"a":{"b":{}}}"#), Err(JsonError::DepthLimitExceeded));
  assert!(Parser::new().with_max_depth(0).parse("1").is_ok());
  assert_eq!(Parser::new().with_max_depth(0).parse("[]"), Err(JsonError::DepthLimitExceeded));

  // Unbounded by default
  let deep = "[".repeat(64) + &"]".repeat(64);
  assert!(parse(&deep).is_ok());
}
