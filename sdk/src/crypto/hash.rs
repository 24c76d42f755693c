//! # Hash Algorithms
//!
//! An account key names the hash its signatures are computed over. The chain
//! identifies them by small integer codes (in account-key encodings) and by
//! upper-case names (in the REST API), so both mappings live here next to the
//! hash functions themselves.
//!
//! Only the SHA-2 and SHA-3 families are supported. KMAC and the BLS-specific
//! hashes are outside what an ECDSA account key can use.

use std::fmt;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha384};
use sha3::{Sha3_256, Sha3_384};

use crate::encoding::EncodingError;

/// Hash function applied to a message before it is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA2-256.
    Sha2_256,
    /// SHA2-384.
    Sha2_384,
    /// SHA3-256.
    Sha3_256,
    /// SHA3-384.
    Sha3_384,
}

impl HashAlgorithm {
    /// Chain-level numeric code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Sha2_256 => 1,
            Self::Sha2_384 => 2,
            Self::Sha3_256 => 3,
            Self::Sha3_384 => 4,
        }
    }

    /// Inverse of [`HashAlgorithm::code`].
    pub fn from_code(code: u32) -> Result<Self, EncodingError> {
        match code {
            1 => Ok(Self::Sha2_256),
            2 => Ok(Self::Sha2_384),
            3 => Ok(Self::Sha3_256),
            4 => Ok(Self::Sha3_384),
            other => Err(EncodingError::UnknownHashAlgorithm(other.to_string())),
        }
    }

    /// Name used by the REST API.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2_256",
            Self::Sha2_384 => "SHA2_384",
            Self::Sha3_256 => "SHA3_256",
            Self::Sha3_384 => "SHA3_384",
        }
    }

    /// Digest width in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha2_256 | Self::Sha3_256 => 32,
            Self::Sha2_384 | Self::Sha3_384 => 48,
        }
    }

    /// Hashes `data`.
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha2_256 => Sha256::digest(data).to_vec(),
            Self::Sha2_384 => Sha384::digest(data).to_vec(),
            Self::Sha3_256 => Sha3_256::digest(data).to_vec(),
            Self::Sha3_384 => Sha3_384::digest(data).to_vec(),
        }
    }
}

/// SHA3-256 into a fixed array. Transaction ids are computed with it.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SHA2_256" | "SHA256" => Ok(Self::Sha2_256),
            "SHA2_384" | "SHA384" => Ok(Self::Sha2_384),
            "SHA3_256" => Ok(Self::Sha3_256),
            "SHA3_384" => Ok(Self::Sha3_384),
            _ => Err(EncodingError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

impl Serialize for HashAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for HashAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for algo in [
            HashAlgorithm::Sha2_256,
            HashAlgorithm::Sha2_384,
            HashAlgorithm::Sha3_256,
            HashAlgorithm::Sha3_384,
        ] {
            assert_eq!(HashAlgorithm::from_code(algo.code()).unwrap(), algo);
            assert_eq!(algo.name().parse::<HashAlgorithm>().unwrap(), algo);
            assert_eq!(algo.hash(b"flow").len(), algo.output_len());
        }
        assert!(HashAlgorithm::from_code(0).is_err());
    }

    #[test]
    fn sha3_empty_input_vector() {
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn sha2_abc_vector() {
        assert_eq!(
            hex::encode(HashAlgorithm::Sha2_256.hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "KMAC128".parse::<HashAlgorithm>(),
            Err(EncodingError::UnknownHashAlgorithm(_))
        ));
    }
}
