//! # Cryptographic Primitives
//!
//! Hashes, ECDSA keys and the [`Signer`] capability. Nothing in here knows
//! what a transaction is; the coordinator in
//! [`crate::transaction::signing`] decides what gets signed.
//!
//! Everything wraps audited RustCrypto implementations (`p256`, `k256`,
//! `sha2`, `sha3`). There is no hand-written curve or hash code here and
//! there should never be.

pub mod hash;
pub mod keys;
pub mod signer;

pub use hash::{sha3_256, HashAlgorithm};
pub use keys::{verify_signature, PrivateKey, SignatureAlgorithm};
pub use signer::{InMemorySigner, Signer, SigningError};
