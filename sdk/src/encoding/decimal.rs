//! Serde adapters that carry integers as decimal strings.
//!
//! Sequence numbers and gas limits are unbounded, and JSON numbers are not.

use num_bigint::BigUint;
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

/// `#[serde(with = "decimal")]` for [`BigUint`] fields.
pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// See [`serialize`].
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse::<BigUint>()
        .map_err(|e| D::Error::custom(format!("invalid unsigned integer {s:?}: {e}")))
}
