use alloc::string::String;
use core::num::IntErrorKind;

use crate::{Number, Malformed, JsonError};

/// A token within a JSON serialization.
#[derive(Clone, PartialEq, Debug)]
pub(crate) enum Token {
  /// `{`
  BeginObject,
  /// `}`
  EndObject,
  /// `[`
  BeginArray,
  /// `]`
  EndArray,
  /// `:`
  Colon,
  /// `,`
  Comma,
  /// A string, with its escapes already resolved.
  String(String),
  /// A number.
  Number(Number),
  /// `true`
  True,
  /// `false`
  False,
  /// `null`
  Null,
  /// The end of the input.
  End,
}

#[inline(always)]
fn malformed(offset: usize, reason: Malformed) -> JsonError {
  JsonError::Malformed { offset, reason }
}

/// If this byte may continue a number.
#[inline(always)]
fn number_byte(b: u8) -> bool {
  matches!(b, b'0' ..= b'9' | b'+' | b'-' | b'.' | b'e' | b'E')
}

/// Decode a run of characters which make up a number.
///
/// Numbers whose magnitude exceeds the range of an `f64` are rejected, as they couldn't be
/// serialized again.
fn decode_number(run: &str, offset: usize) -> Result<Number, JsonError> {
  let invalid = || malformed(offset, Malformed::InvalidNumber);
  let float = |float: f64| {
    if float.is_finite() {
      Ok(Number::Float(float))
    } else {
      Err(invalid())
    }
  };

  let (negative, unsigned) = match run.as_bytes().first() {
    Some(b'-') => (true, &run[1 ..]),
    _ => (false, run),
  };

  // Hexadecimal integers
  if let Some(digits) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
    if digits.is_empty() {
      Err(invalid())?;
    }
    let Ok(magnitude) = u64::from_str_radix(digits, 16) else {
      // Too wide for a 64-bit integer, so represent it as a float
      #[allow(clippy::cast_precision_loss)]
      let magnitude = digits
        .chars()
        .try_fold(0f64, |acc, c| c.to_digit(16).map(|digit| (acc * 16.0) + f64::from(digit)))
        .ok_or_else(invalid)?;
      return float(if negative { -magnitude } else { magnitude });
    };
    return Ok(if negative {
      match i64::try_from(-i128::from(magnitude)) {
        Ok(value) => Number::Signed(value),
        #[allow(clippy::cast_precision_loss)]
        Err(_) => Number::Float(-(magnitude as f64)),
      }
    } else {
      Number::Unsigned(magnitude)
    });
  }

  if run.contains(['.', 'e', 'E']) {
    return run.parse::<f64>().map_err(|_| invalid()).and_then(float);
  }

  let integer = if negative { run.parse::<i64>().map(Number::Signed) } else {
    run.parse::<u64>().map(Number::Unsigned)
  };
  match integer {
    Ok(number) => Ok(number),
    Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
      run.parse::<f64>().map_err(|_| invalid()).and_then(float)
    }
    Err(_) => Err(invalid()),
  }
}

/// A tokenizer over JSON text, with a single token of lookahead.
pub(crate) struct Lexer<'text> {
  text: &'text str,
  offset: usize,
  peeked: Option<(usize, Token, usize)>,
}

impl<'text> Lexer<'text> {
  pub(crate) fn new(text: &'text str) -> Self {
    Self { text, offset: 0, peeked: None }
  }

  fn skip_whitespace(&mut self) {
    if self.peeked.is_some() {
      return;
    }
    let bytes = self.text.as_bytes();
    while matches!(bytes.get(self.offset), Some(b' ' | b'\t' | b'\r' | b'\n')) {
      self.offset += 1;
    }
  }

  /// Peek at the next token without consuming it.
  pub(crate) fn look_ahead(&mut self) -> Result<&Token, JsonError> {
    let peeked = match self.peeked.take() {
      Some(peeked) => peeked,
      None => {
        self.skip_whitespace();
        let start = self.offset;
        let (token, end) = self.scan(start)?;
        (start, token, end)
      }
    };
    Ok(&self.peeked.insert(peeked).1)
  }

  /// Consume the next token, returning the offset it started at alongside it.
  pub(crate) fn next_token(&mut self) -> Result<(usize, Token), JsonError> {
    let (start, token, end) = match self.peeked.take() {
      Some(peeked) => peeked,
      None => {
        self.skip_whitespace();
        let start = self.offset;
        let (token, end) = self.scan(start)?;
        (start, token, end)
      }
    };
    self.offset = end;
    log::trace!("token {token:?} at byte {start}");
    Ok((start, token))
  }

  /// Scan the token starting at `start`, returning it and the offset immediately after it.
  fn scan(&self, start: usize) -> Result<(Token, usize), JsonError> {
    let bytes = self.text.as_bytes();
    let Some(first) = bytes.get(start) else { return Ok((Token::End, start)) };
    let single = |token| -> Result<(Token, usize), JsonError> { Ok((token, start + 1)) };
    match first {
      b'{' => single(Token::BeginObject),
      b'}' => single(Token::EndObject),
      b'[' => single(Token::BeginArray),
      b']' => single(Token::EndArray),
      b':' => single(Token::Colon),
      b',' => single(Token::Comma),
      b'"' => self.scan_string(start),
      b'-' | b'0' ..= b'9' => self.scan_number(start),
      b't' => self.scan_literal(start, "true", Token::True),
      b'f' => self.scan_literal(start, "false", Token::False),
      b'n' => self.scan_literal(start, "null", Token::Null),
      _ => Err(malformed(start, Malformed::UnexpectedToken)),
    }
  }

  fn scan_literal(
    &self,
    start: usize,
    literal: &'static str,
    token: Token,
  ) -> Result<(Token, usize), JsonError> {
    if self.text.as_bytes()[start ..].starts_with(literal.as_bytes()) {
      Ok((token, start + literal.len()))
    } else {
      Err(malformed(start, Malformed::UnexpectedToken))
    }
  }

  fn scan_number(&self, start: usize) -> Result<(Token, usize), JsonError> {
    let bytes = self.text.as_bytes();
    let mut end = start;

    // A `0x` prefix, after an optional sign, selects hexadecimal digits
    let unsigned = if bytes.get(start) == Some(&b'-') { start + 1 } else { start };
    let hex = (bytes.get(unsigned) == Some(&b'0')) &&
      matches!(bytes.get(unsigned + 1), Some(b'x' | b'X'));
    if hex {
      end = unsigned + 2;
      while bytes.get(end).is_some_and(u8::is_ascii_hexdigit) {
        end += 1;
      }
    } else {
      while bytes.get(end).copied().is_some_and(number_byte) {
        end += 1;
      }
    }

    // The run is solely ASCII, so these are character boundaries
    let number = decode_number(&self.text[start .. end], start)?;
    Ok((Token::Number(number), end))
  }

  /// Read four hex digits following a `\u`.
  fn read_hex(&self, at: usize) -> Result<u32, JsonError> {
    self
      .text
      .get(at .. (at + 4))
      .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
      .and_then(|digits| u32::from_str_radix(digits, 16).ok())
      .ok_or(malformed(at, Malformed::InvalidEscape))
  }

  fn scan_string(&self, start: usize) -> Result<(Token, usize), JsonError> {
    let mut string = String::new();
    // Skip the opening quote
    let mut i = start + 1;
    loop {
      let Some(c) = self.text.get(i ..).and_then(|rest| rest.chars().next()) else {
        return Err(malformed(start, Malformed::UnterminatedString));
      };
      match c {
        '"' => return Ok((Token::String(string), i + 1)),
        '\\' => {
          let escape = i;
          let Some(kind) = self.text.as_bytes().get(i + 1) else {
            return Err(malformed(start, Malformed::UnterminatedString));
          };
          i += 2;
          // https://datatracker.ietf.org/doc/html/rfc8259#section-7
          let unescaped = match kind {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\x08',
            b'f' => '\x0c',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
              let mut codepoint = self.read_hex(i)?;
              i += 4;
              match codepoint {
                0xd800 ..= 0xdbff => {
                  // A high surrogate must be immediately followed by its low surrogate
                  if self.text.as_bytes().get(i .. (i + 2)) != Some(b"\\u") {
                    Err(malformed(escape, Malformed::InvalidEscape))?;
                  }
                  let low = self.read_hex(i + 2)?;
                  if !(0xdc00 ..= 0xdfff).contains(&low) {
                    Err(malformed(escape, Malformed::InvalidEscape))?;
                  }
                  i += 6;
                  codepoint = 0x10000 + ((codepoint - 0xd800) << 10) + (low - 0xdc00);
                }
                0xdc00 ..= 0xdfff => Err(malformed(escape, Malformed::InvalidEscape))?,
                _ => {}
              }
              char::from_u32(codepoint).ok_or(malformed(escape, Malformed::InvalidEscape))?
            }
            _ => Err(malformed(escape, Malformed::InvalidEscape))?,
          };
          string.push(unescaped);
        }
        c => {
          string.push(c);
          i += c.len_utf8();
        }
      }
    }
  }
}

#[cfg(test)]
fn tokens(text: &str) -> Result<alloc::vec::Vec<Token>, JsonError> {
  let mut lexer = Lexer::new(text);
  let mut tokens = alloc::vec::Vec::new();
  loop {
    let (_, token) = lexer.next_token()?;
    if token == Token::End {
      return Ok(tokens);
    }
    tokens.push(token);
  }
}

#[test]
fn look_ahead_does_not_consume() {
  let mut lexer = Lexer::new(" [ true ]");
  assert_eq!(lexer.look_ahead().unwrap(), &Token::BeginArray);
  assert_eq!(lexer.next_token().unwrap(), (1, Token::BeginArray));
  assert_eq!(lexer.look_ahead().unwrap(), &Token::True);
  assert_eq!(lexer.next_token().unwrap(), (3, Token::True));
  assert_eq!(lexer.next_token().unwrap(), (8, Token::EndArray));
  assert_eq!(lexer.next_token().unwrap(), (9, Token::End));
}

#[test]
fn strings() {
  assert_eq!(tokens(r#""\u0041""#).unwrap(), [Token::String("A".into())]);
  assert_eq!(tokens(r#""\u00e9""#).unwrap(), [Token::String("é".into())]);
  assert_eq!(tokens(r#""é""#).unwrap(), [Token::String("é".into())]);
  assert_eq!(
    tokens(r#""\"\\\/\b\f\n\r\t""#).unwrap(),
    [Token::String("\"\\/\x08\x0c\n\r\t".into())]
  );
  assert_eq!(tokens(r#""😀""#).unwrap(), [Token::String("\u{1f600}".into())]);

  for malformed_string in
    [r#""\ud83d""#, r#""\ud83dx""#, r#""\ude00""#, r#""\q""#, r#""\u12""#, r#""abc"#, r#""\"#]
  {
    assert!(tokens(malformed_string).unwrap_err().is_malformed(), "{malformed_string}");
  }
  assert_eq!(
    tokens(r#""abc"#),
    Err(JsonError::Malformed { offset: 0, reason: Malformed::UnterminatedString })
  );
}

#[test]
fn numbers() {
  let number = |text: &str| match tokens(text).unwrap().as_slice() {
    [Token::Number(number)] => *number,
    other => panic!("expected a single number, found {other:?}"),
  };
  assert!(matches!(number("0"), Number::Unsigned(0)));
  assert!(matches!(number("18446744073709551615"), Number::Unsigned(u64::MAX)));
  assert!(matches!(number("-9223372036854775808"), Number::Signed(i64::MIN)));
  assert!(matches!(number("-1"), Number::Signed(-1)));
  assert!(matches!(number("1.5"), Number::Float(value) if value.to_bits() == 1.5f64.to_bits()));
  assert!(matches!(number("1e3"), Number::Float(value) if value.to_bits() == 1000f64.to_bits()));
  assert!(matches!(number("2E-1"), Number::Float(_)));
  assert!(matches!(number("18446744073709551616"), Number::Float(_)));
  assert!(matches!(number("-9223372036854775809"), Number::Float(_)));
  assert!(matches!(number("0xff"), Number::Unsigned(255)));
  assert!(matches!(number("-0x10"), Number::Signed(-16)));
  assert!(matches!(number("0x1ffffffffffffffff"), Number::Float(_)));

  // Beyond the range of an `f64`
  let too_wide = "9".repeat(400);
  for malformed_number in
    ["1-2", "-", "1.2.3", "0x", "1e", "1e999", "-1e999", too_wide.as_str()]
  {
    assert_eq!(
      tokens(malformed_number),
      Err(JsonError::Malformed { offset: 0, reason: Malformed::InvalidNumber }),
      "{malformed_number}"
    );
  }
  assert_eq!(
    crate::parse("[1e999]"),
    Err(JsonError::Malformed { offset: 1, reason: Malformed::InvalidNumber })
  );
}

#[test]
fn literals() {
  assert_eq!(tokens("true false null").unwrap(), [Token::True, Token::False, Token::Null]);
  assert_eq!(
    tokens("nul"),
    Err(JsonError::Malformed { offset: 0, reason: Malformed::UnexpectedToken })
  );
  assert_eq!(
    tokens("  @"),
    Err(JsonError::Malformed { offset: 2, reason: Malformed::UnexpectedToken })
  );
}
