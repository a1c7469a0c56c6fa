use core::fmt;

use crate::{JsonError, Value, PropertyType, PropertyValue, OnUnsupported, Field};

/// A 128-bit globally-unique identifier.
///
/// The bytes are held in the mixed-endian layout where the first three groups of the canonical
/// `8-4-4-4-12` form are little-endian and the last two are in order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug)]
pub struct Guid([u8; 16]);

/// The lengths of the groups within the canonical form, in hex characters.
const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

impl Guid {
  /// Create a GUID from its bytes, in their stored layout.
  pub const fn from_bytes(bytes: [u8; 16]) -> Self {
    Self(bytes)
  }

  /// The bytes of this GUID, in their stored layout.
  pub const fn as_bytes(&self) -> &[u8; 16] {
    &self.0
  }

  /// Parse the canonical hyphenated form, such as `00112233-4455-6677-8899-aabbccddeeff`.
  ///
  /// Hex digits may be of either case.
  pub fn parse(text: &str) -> Option<Self> {
    let mut groups = text.split('-');
    let mut canonical = [0; 16];
    let mut i = 0;
    for len in GROUPS {
      let group = groups.next()?;
      if (group.len() != len) || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
        None?;
      }
      for j in (0 .. len).step_by(2) {
        canonical[i] = u8::from_str_radix(&group[j .. (j + 2)], 16).ok()?;
        i += 1;
      }
    }
    if groups.next().is_some() {
      None?;
    }

    // Swap the first three groups into their little-endian layout
    canonical[.. 4].reverse();
    canonical[4 .. 6].reverse();
    canonical[6 .. 8].reverse();
    Some(Self(canonical))
  }
}

impl fmt::Display for Guid {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut canonical = self.0;
    canonical[.. 4].reverse();
    canonical[4 .. 6].reverse();
    canonical[6 .. 8].reverse();

    let mut i = 0;
    for (g, len) in GROUPS.into_iter().enumerate() {
      if g != 0 {
        f.write_str("-")?;
      }
      for byte in &canonical[i .. (i + (len / 2))] {
        write!(f, "{byte:02x}")?;
      }
      i += len / 2;
    }
    Ok(())
  }
}

impl Field for Guid {
  const PROPERTY_TYPE: PropertyType = PropertyType::Guid;
  fn to_value(&self, _: OnUnsupported) -> Result<Value, JsonError> {
    Ok(Value::String(self.to_string()))
  }
  fn from_property(value: PropertyValue) -> Option<Self> {
    match value {
      PropertyValue::Guid(guid) => Some(guid),
      _ => None,
    }
  }
}

#[test]
fn guid() {
  let guid = Guid::parse("00112233-4455-6677-8899-AABBCCDDEEFF").unwrap();
  assert_eq!(
    guid.as_bytes(),
    &[
      0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
      0xff
    ]
  );
  assert_eq!(guid.to_string(), "00112233-4455-6677-8899-aabbccddeeff");
  assert_eq!(Guid::from_bytes(*guid.as_bytes()), guid);
  assert_eq!(crate::to_json(&guid).unwrap(), r#""00112233-4455-6677-8899-aabbccddeeff""#);
  assert_eq!(Guid::default().to_string(), "00000000-0000-0000-0000-000000000000");

  for invalid in [
    "",
    "00112233445566778899aabbccddeeff",
    "00112233-4455-6677-8899-aabbccddeef",
    "00112233-4455-6677-8899-aabbccddeeff-00",
    "0011223g-4455-6677-8899-aabbccddeeff",
    "{00112233-4455-6677-8899-aabbccddeeff}",
  ] {
    assert_eq!(Guid::parse(invalid), None, "{invalid}");
  }
}
