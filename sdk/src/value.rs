//! # Canonical Value Model
//!
//! Script and transaction arguments travel as JSON-Cadence documents such as
//! `{"type":"UInt64","value":"42"}`. Two representations exist:
//!
//! - [`Value`]: the typed, high-level sum type callers build and match on.
//! - [`Argument`]: the encoded JSON bytes, exactly what the canonical
//!   encoder embeds in a transaction and what the access node receives.
//!
//! [`Value::to_argument`] and [`Argument::decode`] are the only bridges
//! between the two and both are exhaustive over [`Value`]'s variants.
//! `serde_json`'s default map is ordered, so the same value always yields the
//! same argument bytes.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::{BigInt, BigUint};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as Json};

use crate::encoding::EncodingError;
use crate::types::Address;

/// Decimal places of `UFix64` and `Fix64`.
pub const UFIX64_DECIMALS: u32 = 8;

const UFIX64_SCALE: u64 = 100_000_000;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// What a [`Value::Composite`] was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Struct,
    Resource,
    Event,
    Contract,
    Enum,
}

impl CompositeKind {
    /// The `"type"` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Struct => "Struct",
            Self::Resource => "Resource",
            Self::Event => "Event",
            Self::Contract => "Contract",
            Self::Enum => "Enum",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Struct" => Some(Self::Struct),
            "Resource" => Some(Self::Resource),
            "Event" => Some(Self::Event),
            "Contract" => Some(Self::Contract),
            "Enum" => Some(Self::Enum),
            _ => None,
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed Cadence value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// The unit value.
    Void,
    /// `T?`.
    Optional(Option<Box<Value>>),
    /// `Bool`.
    Bool(bool),
    /// `String`.
    String(String),
    /// `Character`, a single grapheme kept as text.
    Character(String),
    /// `Address`.
    Address(Address),
    /// Unbounded `Int`.
    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    /// `Int256`, range checked on decode.
    Int256(BigInt),
    /// Unbounded `UInt`.
    UInt(BigUint),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    /// `UInt256`, range checked on decode.
    UInt256(BigUint),
    Word8(u8),
    Word16(u16),
    Word32(u32),
    Word64(u64),
    /// `Fix64`, held as raw units of 10^-8.
    Fix64(i64),
    /// `UFix64`, held as raw units of 10^-8.
    UFix64(u64),
    /// `[T]`.
    Array(Vec<Value>),
    /// `{K: V}`, in insertion order.
    Dictionary(Vec<(Value, Value)>),
    /// Struct, resource, event, contract or enum instance. Fields keep
    /// their declaration order.
    Composite {
        kind: CompositeKind,
        type_id: String,
        fields: Vec<(String, Value)>,
    },
}

impl Value {
    /// Shorthand for `Value::String`.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Cadence type name as it appears in the `"type"` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Optional(_) => "Optional",
            Self::Bool(_) => "Bool",
            Self::String(_) => "String",
            Self::Character(_) => "Character",
            Self::Address(_) => "Address",
            Self::Int(_) => "Int",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Int128(_) => "Int128",
            Self::Int256(_) => "Int256",
            Self::UInt(_) => "UInt",
            Self::UInt8(_) => "UInt8",
            Self::UInt16(_) => "UInt16",
            Self::UInt32(_) => "UInt32",
            Self::UInt64(_) => "UInt64",
            Self::UInt128(_) => "UInt128",
            Self::UInt256(_) => "UInt256",
            Self::Word8(_) => "Word8",
            Self::Word16(_) => "Word16",
            Self::Word32(_) => "Word32",
            Self::Word64(_) => "Word64",
            Self::Fix64(_) => "Fix64",
            Self::UFix64(_) => "UFix64",
            Self::Array(_) => "Array",
            Self::Dictionary(_) => "Dictionary",
            Self::Composite { kind, .. } => kind.as_str(),
        }
    }

    /// A composite's field by name. `None` for missing fields and for
    /// non-composite values.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Composite { fields, .. } => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// JSON-Cadence document for this value.
    pub fn to_json(&self) -> Json {
        let ty = self.type_name();
        let value = match self {
            Self::Void => return json!({ "type": ty }),
            Self::Optional(inner) => json!(inner.as_ref().map(|v| v.to_json())),
            Self::Bool(b) => json!(b),
            Self::String(s) | Self::Character(s) => json!(s),
            Self::Address(a) => json!(a.to_string()),
            Self::Int(n) | Self::Int256(n) => json!(n.to_string()),
            Self::Int8(n) => json!(n.to_string()),
            Self::Int16(n) => json!(n.to_string()),
            Self::Int32(n) => json!(n.to_string()),
            Self::Int64(n) => json!(n.to_string()),
            Self::Int128(n) => json!(n.to_string()),
            Self::UInt(n) | Self::UInt256(n) => json!(n.to_string()),
            Self::UInt8(n) | Self::Word8(n) => json!(n.to_string()),
            Self::UInt16(n) | Self::Word16(n) => json!(n.to_string()),
            Self::UInt32(n) | Self::Word32(n) => json!(n.to_string()),
            Self::UInt64(n) | Self::Word64(n) => json!(n.to_string()),
            Self::UInt128(n) => json!(n.to_string()),
            Self::Fix64(raw) => json!(format_fix64(*raw)),
            Self::UFix64(raw) => json!(format_ufix64(*raw)),
            Self::Array(items) => json!(items.iter().map(Value::to_json).collect::<Vec<_>>()),
            Self::Dictionary(entries) => json!(entries
                .iter()
                .map(|(k, v)| json!({ "key": k.to_json(), "value": v.to_json() }))
                .collect::<Vec<_>>()),
            Self::Composite {
                type_id, fields, ..
            } => json!({
                "id": type_id,
                "fields": fields
                    .iter()
                    .map(|(name, v)| json!({ "name": name, "value": v.to_json() }))
                    .collect::<Vec<_>>(),
            }),
        };
        json!({ "type": ty, "value": value })
    }

    /// Parses a JSON-Cadence document.
    pub fn from_json(doc: &Json) -> Result<Self, EncodingError> {
        let obj = doc
            .as_object()
            .ok_or_else(|| malformed("expected an object"))?;
        let ty = obj
            .get("type")
            .and_then(Json::as_str)
            .ok_or_else(|| malformed("missing \"type\""))?;

        if let Some(kind) = CompositeKind::from_tag(ty) {
            return parse_composite(kind, field(obj, ty)?);
        }

        match ty {
            "Void" => Ok(Self::Void),
            "Optional" => match obj.get("value") {
                None | Some(Json::Null) => Ok(Self::Optional(None)),
                Some(inner) => Ok(Self::Optional(Some(Box::new(Self::from_json(inner)?)))),
            },
            "Bool" => field(obj, ty)?
                .as_bool()
                .map(Self::Bool)
                .ok_or_else(|| malformed("Bool value must be a boolean")),
            "String" => Ok(Self::String(str_field(obj, ty)?.to_string())),
            "Character" => {
                let s = str_field(obj, ty)?;
                if s.is_empty() {
                    return Err(malformed("Character value is empty"));
                }
                Ok(Self::Character(s.to_string()))
            }
            "Address" => Address::from_hex(str_field(obj, ty)?).map(Self::Address),
            "Int" => parse_num(obj, ty).map(Self::Int),
            "Int8" => parse_num(obj, ty).map(Self::Int8),
            "Int16" => parse_num(obj, ty).map(Self::Int16),
            "Int32" => parse_num(obj, ty).map(Self::Int32),
            "Int64" => parse_num(obj, ty).map(Self::Int64),
            "Int128" => parse_num(obj, ty).map(Self::Int128),
            "Int256" => {
                let n: BigInt = parse_num(obj, ty)?;
                let bound = BigInt::from(1u8) << 255u32;
                if n < -bound.clone() || n >= bound {
                    return Err(malformed(format!("Int256 {n} out of range")));
                }
                Ok(Self::Int256(n))
            }
            "UInt" => parse_num(obj, ty).map(Self::UInt),
            "UInt8" => parse_num(obj, ty).map(Self::UInt8),
            "UInt16" => parse_num(obj, ty).map(Self::UInt16),
            "UInt32" => parse_num(obj, ty).map(Self::UInt32),
            "UInt64" => parse_num(obj, ty).map(Self::UInt64),
            "UInt128" => parse_num(obj, ty).map(Self::UInt128),
            "UInt256" => {
                let n: BigUint = parse_num(obj, ty)?;
                if n.bits() > 256 {
                    return Err(malformed(format!("UInt256 {n} out of range")));
                }
                Ok(Self::UInt256(n))
            }
            "Word8" => parse_num(obj, ty).map(Self::Word8),
            "Word16" => parse_num(obj, ty).map(Self::Word16),
            "Word32" => parse_num(obj, ty).map(Self::Word32),
            "Word64" => parse_num(obj, ty).map(Self::Word64),
            "Fix64" => parse_fix64(str_field(obj, ty)?).map(Self::Fix64),
            "UFix64" => parse_ufix64(str_field(obj, ty)?).map(Self::UFix64),
            "Array" => field(obj, ty)?
                .as_array()
                .ok_or_else(|| malformed("Array value must be a list"))?
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            "Dictionary" => field(obj, ty)?
                .as_array()
                .ok_or_else(|| malformed("Dictionary value must be a list"))?
                .iter()
                .map(|entry| {
                    let key = entry
                        .get("key")
                        .ok_or_else(|| malformed("dictionary entry without key"))?;
                    let value = entry
                        .get("value")
                        .ok_or_else(|| malformed("dictionary entry without value"))?;
                    Ok((Self::from_json(key)?, Self::from_json(value)?))
                })
                .collect::<Result<Vec<_>, EncodingError>>()
                .map(Self::Dictionary),
            other => Err(malformed(format!("unsupported type {other:?}"))),
        }
    }

    /// Encodes into the low-level argument form.
    pub fn to_argument(&self) -> Result<Argument, EncodingError> {
        serde_json::to_vec(&self.to_json())
            .map(Argument)
            .map_err(|e| malformed(e.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

fn malformed(msg: impl Into<String>) -> EncodingError {
    EncodingError::Argument(msg.into())
}

fn field<'a>(obj: &'a Map<String, Json>, ty: &str) -> Result<&'a Json, EncodingError> {
    obj.get("value")
        .ok_or_else(|| malformed(format!("{ty} without value")))
}

fn str_field<'a>(obj: &'a Map<String, Json>, ty: &str) -> Result<&'a str, EncodingError> {
    field(obj, ty)?
        .as_str()
        .ok_or_else(|| malformed(format!("{ty} value must be a string")))
}

fn parse_composite(kind: CompositeKind, body: &Json) -> Result<Value, EncodingError> {
    let type_id = body
        .get("id")
        .and_then(Json::as_str)
        .ok_or_else(|| malformed(format!("{kind} without id")))?;
    let fields = body
        .get("fields")
        .and_then(Json::as_array)
        .ok_or_else(|| malformed(format!("{kind} {type_id} without fields")))?
        .iter()
        .map(|entry| {
            let name = entry
                .get("name")
                .and_then(Json::as_str)
                .ok_or_else(|| malformed(format!("{type_id} field without name")))?;
            let value = entry
                .get("value")
                .ok_or_else(|| malformed(format!("{type_id}.{name} has no value")))?;
            Ok((name.to_string(), Value::from_json(value)?))
        })
        .collect::<Result<Vec<_>, EncodingError>>()?;
    Ok(Value::Composite {
        kind,
        type_id: type_id.to_string(),
        fields,
    })
}

/// `true` for a non-empty run of ASCII digits. `str::parse` alone would also
/// take a leading `+`.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Integer strings are plain decimal: an optional `-` followed by digits.
fn parse_num<T: std::str::FromStr>(obj: &Map<String, Json>, ty: &str) -> Result<T, EncodingError>
where
    T::Err: fmt::Display,
{
    let s = str_field(obj, ty)?;
    if !is_digits(s.strip_prefix('-').unwrap_or(s)) {
        return Err(malformed(format!("{ty} {s:?} is not a decimal integer")));
    }
    s.parse::<T>()
        .map_err(|e| malformed(format!("{ty} {s:?}: {e}")))
}

/// Formats raw units as a fixed-point string with all 8 decimals.
pub fn format_ufix64(raw: u64) -> String {
    format!("{}.{:08}", raw / UFIX64_SCALE, raw % UFIX64_SCALE)
}

/// Signed counterpart of [`format_ufix64`].
pub fn format_fix64(raw: i64) -> String {
    let sign = if raw < 0 { "-" } else { "" };
    format!("{sign}{}", format_ufix64(raw.unsigned_abs()))
}

/// Parses `"12.5"` into raw units. More than 8 decimals is an error rather
/// than a silent rounding.
pub fn parse_ufix64(s: &str) -> Result<u64, EncodingError> {
    fixed_point_units(s, "UFix64")
}

/// Parses `"-12.5"` into raw units.
pub fn parse_fix64(s: &str) -> Result<i64, EncodingError> {
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let units = i128::from(fixed_point_units(magnitude, "Fix64")?);
    i64::try_from(if negative { -units } else { units })
        .map_err(|_| malformed(format!("Fix64 {s:?} overflows")))
}

// Digits with an optional fraction; both sides non-empty when the point is
// present.
fn fixed_point_units(s: &str, ty: &str) -> Result<u64, EncodingError> {
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => {
            if !is_digits(frac) {
                return Err(malformed(format!("{ty} {s:?} has no valid fraction")));
            }
            (whole, frac)
        }
        None => (s, ""),
    };
    if !is_digits(whole) {
        return Err(malformed(format!("{ty} {s:?} has no valid integer part")));
    }
    if frac.len() > UFIX64_DECIMALS as usize {
        return Err(malformed(format!("{ty} {s:?} has more than 8 decimals")));
    }
    let overflow = || malformed(format!("{ty} {s:?} overflows"));
    let whole: u64 = whole.parse().map_err(|_| overflow())?;
    let frac_units: u64 = if frac.is_empty() {
        0
    } else {
        let digits: u64 = frac.parse().map_err(|_| overflow())?;
        digits * 10u64.pow(UFIX64_DECIMALS - frac.len() as u32)
    };
    whole
        .checked_mul(UFIX64_SCALE)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(overflow)
}

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// Encoded JSON-Cadence bytes, passed through to the chain verbatim.
///
/// Serializes as base64, the form the REST API uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument(Vec<u8>);

impl Argument {
    /// Wraps pre-encoded JSON-Cadence bytes without validating them.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parses the bytes back into a [`Value`].
    pub fn decode(&self) -> Result<Value, EncodingError> {
        let doc: Json = serde_json::from_slice(&self.0).map_err(|e| malformed(e.to_string()))?;
        Value::from_json(&doc)
    }
}

impl TryFrom<&Value> for Argument {
    type Error = EncodingError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.to_argument()
    }
}

impl Serialize for Argument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Argument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(s).map(Self).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_argument_bytes() {
        let arg = Value::string("hello").to_argument().unwrap();
        assert_eq!(
            std::str::from_utf8(arg.as_bytes()).unwrap(),
            r#"{"type":"String","value":"hello"}"#
        );
    }

    #[test]
    fn integers_are_strings_on_the_wire() {
        let arg = Value::UInt64(42).to_argument().unwrap();
        assert_eq!(
            std::str::from_utf8(arg.as_bytes()).unwrap(),
            r#"{"type":"UInt64","value":"42"}"#
        );
    }

    #[test]
    fn address_has_prefix() {
        let addr = Address::from_hex("f8d6e0586b0a20c7").unwrap();
        let json = Value::Address(addr).to_json();
        assert_eq!(json["value"], "0xf8d6e0586b0a20c7");
    }

    #[test]
    fn nested_values_survive_decode() {
        let value = Value::Dictionary(vec![(
            Value::string("keys"),
            Value::Array(vec![
                Value::Optional(Some(Box::new(Value::UInt8(7)))),
                Value::Optional(None),
                Value::UInt(BigUint::from(u128::MAX)),
                Value::Int64(-3),
                Value::Int8(-128),
                Value::Int128(i128::MIN),
                Value::Int(BigInt::from(-5)),
                Value::Word64(u64::MAX),
                Value::Fix64(-1),
                Value::UFix64(1),
                Value::Character("é".into()),
                Value::Bool(true),
                Value::Void,
                Value::Composite {
                    kind: CompositeKind::Struct,
                    type_id: "A.0000000000000001.Point".into(),
                    fields: vec![
                        ("x".into(), Value::Int32(1)),
                        ("tag".into(), Value::Optional(None)),
                    ],
                },
                Value::Composite {
                    kind: CompositeKind::Enum,
                    type_id: "A.0000000000000001.Color".into(),
                    fields: vec![("rawValue".into(), Value::UInt8(2))],
                },
            ]),
        )]);
        let arg = value.to_argument().unwrap();
        assert_eq!(arg.decode().unwrap(), value);
    }

    #[test]
    fn ufix64_formatting_and_parsing() {
        assert_eq!(format_ufix64(1_050_000_000), "10.50000000");
        assert_eq!(parse_ufix64("10.5").unwrap(), 1_050_000_000);
        assert_eq!(parse_ufix64("0.00000001").unwrap(), 1);
        assert_eq!(parse_ufix64("7").unwrap(), 700_000_000);
        assert!(parse_ufix64("0.000000001").is_err());
        assert!(parse_ufix64("abc").is_err());
    }

    #[test]
    fn ufix64_rejects_signs_and_empty_parts() {
        for bad in ["1.+5", "+2", ".5", "1.", "-1", "", "1.5.0", " 1"] {
            assert!(parse_ufix64(bad).is_err(), "{bad:?} should be rejected");
        }
        let doc = json!({ "type": "UFix64", "value": "1.+5" });
        assert!(Value::from_json(&doc).is_err());
    }

    #[test]
    fn fix64_is_signed() {
        assert_eq!(parse_fix64("-0.5").unwrap(), -50_000_000);
        assert_eq!(parse_fix64("3").unwrap(), 300_000_000);
        assert_eq!(format_fix64(-50_000_000), "-0.50000000");
        assert_eq!(format_fix64(i64::MIN), "-92233720368.54775808");
        assert_eq!(parse_fix64("-92233720368.54775808").unwrap(), i64::MIN);
        assert!(parse_fix64("92233720368.54775808").is_err());
        assert!(parse_fix64("+1").is_err());
        assert!(parse_fix64("--1").is_err());
    }

    #[test]
    fn integer_strings_are_plain_decimal() {
        let parse = |ty: &str, v: &str| Value::from_json(&json!({ "type": ty, "value": v }));
        assert_eq!(parse("Int64", "-3").unwrap(), Value::Int64(-3));
        assert!(parse("UInt64", "+3").is_err());
        assert!(parse("UInt64", "-3").is_err());
        assert!(parse("Int", "+3").is_err());
        assert!(parse("Word8", "256").is_err());
        assert_eq!(parse("Word8", "255").unwrap(), Value::Word8(255));
    }

    #[test]
    fn wide_integers_are_range_checked() {
        let parse = |ty: &str, v: String| Value::from_json(&json!({ "type": ty, "value": v }));
        let two_256 = BigUint::from(1u8) << 256u32;
        let max = two_256.clone() - 1u8;
        assert_eq!(
            parse("UInt256", max.to_string()).unwrap(),
            Value::UInt256(max.clone())
        );
        assert!(parse("UInt256", two_256.to_string()).is_err());

        let min = -(BigInt::from(1u8) << 255u32);
        assert_eq!(parse("Int256", min.to_string()).unwrap(), Value::Int256(min.clone()));
        assert!(parse("Int256", (min - 1i32).to_string()).is_err());
        assert_eq!(
            parse("UInt128", u128::MAX.to_string()).unwrap(),
            Value::UInt128(u128::MAX)
        );
    }

    #[test]
    fn account_created_event_decodes_as_composite() {
        let doc: Json = serde_json::from_str(
            r#"{"type":"Event","value":{"id":"flow.AccountCreated","fields":[
                {"name":"address","value":{"type":"Address","value":"0x01cf0e2f2f715450"}}
            ]}}"#,
        )
        .unwrap();
        let value = Value::from_json(&doc).unwrap();
        let address = Address::from_hex("01cf0e2f2f715450").unwrap();
        assert_eq!(
            value,
            Value::Composite {
                kind: CompositeKind::Event,
                type_id: "flow.AccountCreated".into(),
                fields: vec![("address".into(), Value::Address(address))],
            }
        );
        assert_eq!(value.field("address"), Some(&Value::Address(address)));
        assert_eq!(value.field("missing"), None);
        assert_eq!(value.type_name(), "Event");
    }

    #[test]
    fn composite_without_fields_is_rejected() {
        let doc = json!({ "type": "Struct", "value": { "id": "A.0000000000000001.Foo" } });
        assert!(Value::from_json(&doc).is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let arg = Argument::from_bytes(br#"{"type":"Path","value":{}}"#.to_vec());
        assert!(matches!(arg.decode(), Err(EncodingError::Argument(_))));
    }

    #[test]
    fn missing_value_is_rejected() {
        let arg = Argument::from_bytes(br#"{"type":"UInt64"}"#.to_vec());
        assert!(arg.decode().is_err());
    }

    #[test]
    fn argument_serde_is_base64() {
        let arg = Value::Bool(false).to_argument().unwrap();
        let json = serde_json::to_string(&arg).unwrap();
        let back: Argument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arg);
        assert!(!json.contains('{'));
    }
}
