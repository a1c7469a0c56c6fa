use time::{
  Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
  macros::format_description,
};

use crate::{JsonError, Number, Value, PropertyType, PropertyValue, OnUnsupported, Field};

/// Narrow a number to a declared numeric type.
///
/// Integers are truncated to the declared width. Floats converted to integers saturate, with NaN
/// becoming zero.
#[allow(
  clippy::cast_possible_truncation,
  clippy::cast_sign_loss,
  clippy::cast_possible_wrap,
  clippy::cast_precision_loss
)]
pub(crate) fn narrow(declared: PropertyType, number: Number) -> Option<PropertyValue> {
  macro_rules! cast {
    ($ty: ty) => {
      match number {
        Number::Unsigned(value) => value as $ty,
        Number::Signed(value) => value as $ty,
        Number::Float(value) => value as $ty,
      }
    };
  }

  Some(match declared {
    PropertyType::I8 => PropertyValue::I8(cast!(i8)),
    PropertyType::I16 => PropertyValue::I16(cast!(i16)),
    PropertyType::I32 => PropertyValue::I32(cast!(i32)),
    PropertyType::I64 => PropertyValue::I64(cast!(i64)),
    PropertyType::U8 => PropertyValue::U8(cast!(u8)),
    PropertyType::U16 => PropertyValue::U16(cast!(u16)),
    PropertyType::U32 => PropertyValue::U32(cast!(u32)),
    PropertyType::U64 => PropertyValue::U64(cast!(u64)),
    PropertyType::F32 => PropertyValue::F32(cast!(f32)),
    PropertyType::F64 => PropertyValue::F64(cast!(f64)),
    _ => None?,
  })
}

/// The amount of ticks (100 ns intervals) within a second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Decode `Date(ticks)`, with the ticks counted from 0001-01-01T00:00Z.
fn parse_ticks(text: &str) -> Option<OffsetDateTime> {
  let start = text.find("Date(")? + "Date(".len();
  let rest = &text[start ..];
  let end = rest
    .char_indices()
    .find(|(i, c)| !(c.is_ascii_digit() || ((*i == 0) && (*c == '-'))))
    .map(|(i, _)| i)
    .unwrap_or(rest.len());
  let ticks = rest[.. end].parse::<i64>().ok()?;

  let epoch =
    PrimitiveDateTime::new(Date::from_calendar_date(1, Month::January, 1).ok()?, Time::MIDNIGHT)
      .assume_utc();
  let elapsed = Duration::seconds(ticks.div_euclid(TICKS_PER_SECOND)) +
    Duration::nanoseconds(ticks.rem_euclid(TICKS_PER_SECOND) * 100);
  epoch.checked_add(elapsed)
}

/// Read a fixed amount of decimal digits.
fn digits(rest: &mut &[u8], len: usize) -> Option<u32> {
  let (digits, after) = rest.split_at_checked(len)?;
  let mut res = 0;
  for digit in digits {
    if !digit.is_ascii_digit() {
      None?;
    }
    res = (res * 10) + u32::from(digit - b'0');
  }
  *rest = after;
  Some(res)
}

/// Consume a byte if it's next.
fn eat(rest: &mut &[u8], byte: u8) -> bool {
  match rest.split_first() {
    Some((first, after)) if *first == byte => {
      *rest = after;
      true
    }
    _ => false,
  }
}

/// Decode `YYYY-MM-DD[THH:MM[:SS[.fff]]][Z|+HH:MM|-HH:MM]`.
///
/// An offset is applied by adding (`+`) or subtracting (`-`) its hours and minutes. A missing
/// zone is read as UTC.
fn parse_iso8601(text: &str) -> Option<OffsetDateTime> {
  let date = Date::parse(text.get(.. 10)?, format_description!("[year]-[month]-[day]")).ok()?;
  let mut rest = text.get(10 ..)?.as_bytes();

  let mut time = Time::MIDNIGHT;
  if eat(&mut rest, b'T') || eat(&mut rest, b' ') {
    let hour = digits(&mut rest, 2)?;
    if !eat(&mut rest, b':') {
      None?;
    }
    let minute = digits(&mut rest, 2)?;

    let mut second = 0;
    let mut nanosecond = 0;
    if eat(&mut rest, b':') {
      second = digits(&mut rest, 2)?;
      if eat(&mut rest, b'.') {
        // Digits beyond nanosecond precision are dropped
        let mut precision = 0;
        while let Some((digit, after)) =
          rest.split_first().filter(|(digit, _)| digit.is_ascii_digit())
        {
          if precision < 9 {
            nanosecond = (nanosecond * 10) + u32::from(digit - b'0');
            precision += 1;
          }
          rest = after;
        }
        if precision == 0 {
          None?;
        }
        nanosecond *= 10u32.pow(9 - precision);
      }
    }

    time = Time::from_hms_nano(
      u8::try_from(hour).ok()?,
      u8::try_from(minute).ok()?,
      u8::try_from(second).ok()?,
      nanosecond,
    )
    .ok()?;
  }
  let timestamp = PrimitiveDateTime::new(date, time).assume_utc();

  if rest.is_empty() || (rest == b"Z".as_slice()) {
    return Some(timestamp);
  }
  let add = if eat(&mut rest, b'+') {
    true
  } else if eat(&mut rest, b'-') {
    false
  } else {
    None?
  };
  let hours = digits(&mut rest, 2)?;
  eat(&mut rest, b':');
  let minutes = digits(&mut rest, 2)?;
  if !rest.is_empty() {
    None?;
  }

  let offset = Duration::hours(i64::from(hours)) + Duration::minutes(i64::from(minutes));
  if add { timestamp.checked_add(offset) } else { timestamp.checked_sub(offset) }
}

/// Decode a timestamp from either `Date(ticks)` or ISO-8601.
pub(crate) fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
  if text.contains("Date(") { parse_ticks(text) } else { parse_iso8601(text) }
}

/// Encode a timestamp as ISO-8601 (`YYYY-MM-DDTHH:MM:SS.mmmZ`), in UTC.
pub(crate) fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, JsonError> {
  timestamp
    .checked_to_offset(UtcOffset::UTC)
    .and_then(|timestamp| {
      timestamp
        .format(format_description!(
          "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .ok()
    })
    .ok_or(JsonError::UnsupportedValue("timestamp"))
}

impl Field for OffsetDateTime {
  const PROPERTY_TYPE: PropertyType = PropertyType::Timestamp;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    format_timestamp(*self).map(Value::String)
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Timestamp(timestamp) => Some(timestamp),
      _ => None,
    }
  }
}

#[test]
fn narrowing() {
  let narrowed = |declared, number| match narrow(declared, number) {
    Some(PropertyValue::U8(value)) => i128::from(value),
    Some(PropertyValue::I32(value)) => i128::from(value),
    Some(PropertyValue::U64(value)) => i128::from(value),
    _ => panic!("unexpected narrowing"),
  };
  assert_eq!(narrowed(PropertyType::U8, Number::Unsigned(300)), 44);
  assert_eq!(narrowed(PropertyType::U8, Number::Signed(-1)), 255);
  assert_eq!(narrowed(PropertyType::U64, Number::Signed(-1)), i128::from(u64::MAX));
  assert_eq!(narrowed(PropertyType::I32, Number::Float(1.9)), 1);
  assert_eq!(narrowed(PropertyType::I32, Number::Float(1e10)), i128::from(i32::MAX));
  assert_eq!(narrowed(PropertyType::U8, Number::Float(-1.0)), 0);
  assert_eq!(narrowed(PropertyType::U8, Number::Float(f64::NAN)), 0);
  assert!(matches!(
    narrow(PropertyType::F32, Number::Unsigned(3)),
    Some(PropertyValue::F32(value)) if value.to_bits() == 3f32.to_bits()
  ));
  assert!(narrow(PropertyType::String, Number::Unsigned(1)).is_none());
}

#[test]
fn timestamps() {
  use time::macros::datetime;

  assert_eq!(
    parse_timestamp("2024-03-05T10:20:30.123Z"),
    Some(datetime!(2024-03-05 10:20:30.123 UTC))
  );
  assert_eq!(parse_timestamp("2024-03-05"), Some(datetime!(2024-03-05 0:00 UTC)));
  assert_eq!(parse_timestamp("2024-03-05T10:20"), Some(datetime!(2024-03-05 10:20 UTC)));
  assert_eq!(
    parse_timestamp("2024-03-05T10:20:30.1234567891"),
    Some(datetime!(2024-03-05 10:20:30.123456789 UTC))
  );
  // Offsets are added or subtracted as written
  assert_eq!(parse_timestamp("2024-03-05T10:20+02:00"), Some(datetime!(2024-03-05 12:20 UTC)));
  assert_eq!(parse_timestamp("2024-03-05T10:20:00-0130"), Some(datetime!(2024-03-05 08:50 UTC)));

  let epoch =
    PrimitiveDateTime::new(Date::from_calendar_date(1, Month::January, 1).unwrap(), Time::MIDNIGHT)
      .assume_utc();
  assert_eq!(parse_timestamp("/Date(0)/"), Some(epoch));
  assert_eq!(parse_timestamp("Date(10000001)"), Some(epoch + Duration::nanoseconds(1_000_000_100)));
  assert_eq!(parse_timestamp("/Date(621355968000000000)/"), Some(datetime!(1970-01-01 0:00 UTC)));

  for invalid in [
    "",
    "yesterday",
    "2024-13-01",
    "2024-03-05T10",
    "2024-03-05T10:20Q",
    "2024-03-05T10:20:30.",
    "Date(x)",
  ] {
    assert_eq!(parse_timestamp(invalid), None, "{invalid}");
  }
}

#[test]
fn timestamp_formatting() {
  use time::macros::datetime;

  assert_eq!(
    format_timestamp(datetime!(2024-03-05 10:20:30.123456 UTC)).unwrap(),
    "2024-03-05T10:20:30.123Z"
  );
  assert_eq!(format_timestamp(datetime!(2024-03-05 12:00 +2)).unwrap(), "2024-03-05T10:00:00.000Z");
  assert_eq!(
    crate::to_json(&datetime!(1999-12-31 23:59:59 UTC)).unwrap(),
    r#""1999-12-31T23:59:59.000Z""#
  );

  let timestamp = datetime!(2024-03-05 10:20:30.123 UTC);
  assert_eq!(parse_timestamp(&format_timestamp(timestamp).unwrap()), Some(timestamp));
}
