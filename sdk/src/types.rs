//! Fixed-width identifiers.
//!
//! Both types are plain byte arrays. Width violations are rejected when a
//! value is constructed, so the encoder never has to pad or truncate.

use std::fmt;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{ADDRESS_LENGTH, ID_LENGTH};
use crate::encoding::EncodingError;

/// Left-pads `bytes` into a fixed array, rejecting inputs that are too long.
fn left_pad<const N: usize>(kind: &'static str, bytes: &[u8]) -> Result<[u8; N], EncodingError> {
    if bytes.len() > N {
        return Err(EncodingError::InvalidLength {
            kind,
            max: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out[N - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

/// Decodes hex with or without a `0x` prefix. Odd-length input gets a
/// leading zero nibble, so `"1"` and `"01"` are the same value.
fn decode_hex(kind: &'static str, s: &str) -> Result<Vec<u8>, EncodingError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    decoded.map_err(|e| EncodingError::InvalidHex {
        kind,
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An 8-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address from up to 8 bytes, left-padding with zeros.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncodingError> {
        left_pad("address", bytes).map(Self)
    }

    /// Parses hex (`"01"`, `"0xf8d6e0586b0a20c7"`).
    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        Self::from_slice(&decode_hex("address", s)?)
    }

    /// The raw bytes, always exactly 8 of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lower-case hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Id
// ---------------------------------------------------------------------------

/// A 32-byte block, collection or transaction id.
///
/// [`Id::ZERO`] is a valid value meaning "no reference"; it still encodes as
/// 32 zero bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id([u8; ID_LENGTH]);

impl Id {
    /// The all-zero sentinel.
    pub const ZERO: Id = Id([0u8; ID_LENGTH]);

    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an id from up to 32 bytes, left-padding with zeros. An empty
    /// slice yields [`Id::ZERO`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncodingError> {
        left_pad("id", bytes).map(Self)
    }

    /// Parses hex with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        Self::from_slice(&decode_hex("id", s)?)
    }

    /// The raw bytes, always exactly 32 of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lower-case hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns `true` for the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_is_left_padded() {
        let addr = Address::from_hex("01").unwrap();
        assert_eq!(addr.as_bytes(), &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(addr.to_string(), "0x0000000000000001");
    }

    #[test]
    fn address_accepts_prefix_and_odd_length() {
        let a = Address::from_hex("0xf8d6e0586b0a20c7").unwrap();
        assert_eq!(a.to_hex(), "f8d6e0586b0a20c7");
        assert_eq!(Address::from_hex("1").unwrap(), Address::from_hex("0x01").unwrap());
    }

    #[test]
    fn oversized_address_is_rejected() {
        let err = Address::from_hex("010203040506070809").unwrap_err();
        assert_eq!(
            err,
            EncodingError::InvalidLength {
                kind: "address",
                max: 8,
                actual: 9
            }
        );
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(matches!(
            Address::from_hex("zz"),
            Err(EncodingError::InvalidHex { kind: "address", .. })
        ));
    }

    #[test]
    fn empty_id_is_zero_sentinel() {
        let id = Id::from_hex("").unwrap();
        assert_eq!(id, Id::ZERO);
        assert!(id.is_zero());
        assert_eq!(id.as_bytes().len(), 32);
    }

    #[test]
    fn oversized_id_is_rejected() {
        assert!(Id::from_slice(&[1u8; 33]).is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let addr = Address::from_hex("01").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0000000000000001\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let id = Id::from_hex("ab").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
