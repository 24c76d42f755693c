//! # Key Material
//!
//! ECDSA private keys on the two curves the chain accepts for account keys,
//! plus signature verification.
//!
//! ## Pre-hashing
//!
//! The chain verifies `ecdsa_verify(pub, H(message), sig)` where `H` is the
//! account key's declared hash algorithm. Both `p256` and `k256` would happily
//! hash the message themselves, but only ever with SHA2-256. So we always
//! hash first with `H` and hand the digest to the curve's
//! [`PrehashSigner`]: the primitive signs exactly the bytes we computed and
//! never hashes them a second time. For SHA2-256 keys this produces the same
//! signature the curve's own hashing `sign` would (RFC 6979 nonces are
//! deterministic), which the tests below pin down.
//!
//! ## Wire formats
//!
//! - Private keys are 32-byte big-endian scalars.
//! - Public keys are the 64-byte `x || y` of the uncompressed SEC1 point,
//!   without the leading `0x04`.
//! - Signatures are the 64-byte `r || s`, not DER.

use std::fmt;
use std::str::FromStr;

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::hash::HashAlgorithm;
use super::signer::SigningError;
use crate::config::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH};
use crate::encoding::EncodingError;

// ---------------------------------------------------------------------------
// SignatureAlgorithm
// ---------------------------------------------------------------------------

/// Curve an account key lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// ECDSA over NIST P-256.
    EcdsaP256,
    /// ECDSA over secp256k1.
    EcdsaSecp256k1,
}

impl SignatureAlgorithm {
    /// Chain-level numeric code.
    pub fn code(&self) -> u32 {
        match self {
            Self::EcdsaP256 => 2,
            Self::EcdsaSecp256k1 => 3,
        }
    }

    /// Inverse of [`SignatureAlgorithm::code`].
    pub fn from_code(code: u32) -> Result<Self, EncodingError> {
        match code {
            2 => Ok(Self::EcdsaP256),
            3 => Ok(Self::EcdsaSecp256k1),
            other => Err(EncodingError::UnknownSignatureAlgorithm(other.to_string())),
        }
    }

    /// Name used by the REST API.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ECDSA_P256",
            Self::EcdsaSecp256k1 => "ECDSA_secp256k1",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "ecdsa_p256" | "p256" => Ok(Self::EcdsaP256),
            "ecdsa_secp256k1" | "secp256k1" => Ok(Self::EcdsaSecp256k1),
            _ => Err(EncodingError::UnknownSignatureAlgorithm(s.to_string())),
        }
    }
}

impl Serialize for SignatureAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SignatureAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// An in-memory ECDSA private key.
///
/// `Debug` never prints the scalar.
#[derive(Clone)]
pub enum PrivateKey {
    /// P-256 key.
    P256(p256::ecdsa::SigningKey),
    /// secp256k1 key.
    Secp256k1(k256::ecdsa::SigningKey),
}

impl PrivateKey {
    /// Generates a fresh key from the OS RNG.
    pub fn generate(algorithm: SignatureAlgorithm) -> Self {
        match algorithm {
            SignatureAlgorithm::EcdsaP256 => {
                Self::P256(p256::ecdsa::SigningKey::random(&mut OsRng))
            }
            SignatureAlgorithm::EcdsaSecp256k1 => {
                Self::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng))
            }
        }
    }

    /// Loads a 32-byte scalar. Zero and out-of-range scalars are rejected.
    pub fn from_bytes(algorithm: SignatureAlgorithm, bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(SigningError::InvalidKey(format!(
                "expected {PRIVATE_KEY_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        match algorithm {
            SignatureAlgorithm::EcdsaP256 => p256::ecdsa::SigningKey::from_slice(bytes)
                .map(Self::P256)
                .map_err(|e| SigningError::InvalidKey(e.to_string())),
            SignatureAlgorithm::EcdsaSecp256k1 => k256::ecdsa::SigningKey::from_slice(bytes)
                .map(Self::Secp256k1)
                .map_err(|e| SigningError::InvalidKey(e.to_string())),
        }
    }

    /// Loads a hex-encoded scalar (optional `0x`).
    pub fn from_hex(algorithm: SignatureAlgorithm, s: &str) -> Result<Self, SigningError> {
        let digits = s.trim().trim_start_matches("0x");
        let bytes = hex::decode(digits).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        Self::from_bytes(algorithm, &bytes)
    }

    /// Curve of this key.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::P256(_) => SignatureAlgorithm::EcdsaP256,
            Self::Secp256k1(_) => SignatureAlgorithm::EcdsaSecp256k1,
        }
    }

    /// The raw scalar. Handle with care.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::P256(k) => k.to_bytes().to_vec(),
            Self::Secp256k1(k) => k.to_bytes().to_vec(),
        }
    }

    /// 64-byte `x || y` public key.
    pub fn public_key(&self) -> Vec<u8> {
        let point = match self {
            Self::P256(k) => k.verifying_key().as_affine().to_encoded_point(false).as_bytes().to_vec(),
            Self::Secp256k1(k) => k
                .verifying_key()
                .as_affine()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec(),
        };
        // Drop the SEC1 0x04 tag.
        point[1..].to_vec()
    }

    /// Signs an already-computed digest. The digest is not hashed again.
    pub fn sign_prehashed(&self, digest: &[u8]) -> Result<Vec<u8>, SigningError> {
        match self {
            Self::P256(k) => {
                let sig: p256::ecdsa::Signature = k
                    .sign_prehash(digest)
                    .map_err(|e| SigningError::Backend(e.to_string()))?;
                Ok(sig.to_bytes().to_vec())
            }
            Self::Secp256k1(k) => {
                let sig: k256::ecdsa::Signature = k
                    .sign_prehash(digest)
                    .map_err(|e| SigningError::Backend(e.to_string()))?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }

    /// Hashes `message` with `hash` and signs the digest.
    pub fn sign(&self, hash: HashAlgorithm, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.sign_prehashed(&hash.hash(message))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a raw `r || s` signature over `message` against a 64-byte public
/// key. Returns `false` for malformed keys or signatures rather than erroring.
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    hash: HashAlgorithm,
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> bool {
    if public_key.len() != PUBLIC_KEY_LENGTH {
        return false;
    }
    let mut sec1 = Vec::with_capacity(PUBLIC_KEY_LENGTH + 1);
    sec1.push(0x04);
    sec1.extend_from_slice(public_key);
    let digest = hash.hash(message);

    match algorithm {
        SignatureAlgorithm::EcdsaP256 => {
            let (Ok(key), Ok(sig)) = (
                p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1),
                p256::ecdsa::Signature::from_slice(signature),
            ) else {
                return false;
            };
            key.verify_prehash(&digest, &sig).is_ok()
        }
        SignatureAlgorithm::EcdsaSecp256k1 => {
            let (Ok(key), Ok(sig)) = (
                k256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1),
                k256::ecdsa::Signature::from_slice(signature),
            ) else {
                return false;
            };
            key.verify_prehash(&digest, &sig).is_ok()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
