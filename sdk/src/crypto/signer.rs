//! The signer capability.
//!
//! A [`Signer`] is one account key able to sign bytes. It knows nothing about
//! transactions: the signing coordinator decides which bytes to hand it and
//! where the resulting signature goes. Hardware wallets, remote KMS keys and
//! the in-memory [`InMemorySigner`] all sit behind the same trait.

use async_trait::async_trait;
use thiserror::Error;

use super::hash::HashAlgorithm;
use super::keys::{PrivateKey, SignatureAlgorithm};
use crate::types::Address;

/// Why a signature could not be produced. Fatal to the signing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// Key material is corrupt or out of range.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The signer was asked for a curve or hash it cannot do.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A required signer was not supplied.
    #[error("no signer supplied for {address}")]
    MissingSigner {
        /// Account that still needs to sign.
        address: Address,
    },

    /// The record's account is not a proposer, payer or authorizer of the
    /// transaction.
    #[error("{address} is not a signer of this transaction")]
    NotASigner {
        /// Account that produced the record.
        address: Address,
    },

    /// An external signing backend failed.
    #[error("signing backend failed: {0}")]
    Backend(String),
}

/// One account key that can sign.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Account the key belongs to.
    fn address(&self) -> Address;

    /// Index of the key on that account.
    fn key_index(&self) -> u32;

    /// Hash applied to the message before signing.
    fn hash_algorithm(&self) -> HashAlgorithm;

    /// Curve of the key.
    fn signature_algorithm(&self) -> SignatureAlgorithm;

    /// Signs `message`, returning raw `r || s`.
    ///
    /// Implementations must not keep `message` after returning.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// A [`Signer`] backed by a key held in process memory.
#[derive(Debug, Clone)]
pub struct InMemorySigner {
    address: Address,
    key_index: u32,
    hash_algorithm: HashAlgorithm,
    key: PrivateKey,
}

impl InMemorySigner {
    /// Binds `key` to `(address, key_index)`.
    pub fn new(
        address: Address,
        key_index: u32,
        key: PrivateKey,
        hash_algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            address,
            key_index,
            hash_algorithm,
            key,
        }
    }

    /// Public half of the key.
    pub fn public_key(&self) -> Vec<u8> {
        self.key.public_key()
    }
}

#[async_trait]
impl Signer for InMemorySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn key_index(&self) -> u32 {
        self.key_index
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.key.algorithm()
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.key.sign(self.hash_algorithm, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::verify_signature;

    #[tokio::test]
    async fn in_memory_signer_signs_with_declared_hash() {
        let key = PrivateKey::generate(SignatureAlgorithm::EcdsaSecp256k1);
        let signer = InMemorySigner::new(
            Address::from_hex("01").unwrap(),
            3,
            key,
            HashAlgorithm::Sha3_256,
        );

        let sig = signer.sign(b"payload").await.unwrap();
        assert!(verify_signature(
            signer.signature_algorithm(),
            signer.hash_algorithm(),
            &signer.public_key(),
            b"payload",
            &sig,
        ));
        assert_eq!(signer.key_index(), 3);
    }

    #[tokio::test]
    async fn works_as_trait_object() {
        let signer: std::sync::Arc<dyn Signer> = std::sync::Arc::new(InMemorySigner::new(
            Address::from_hex("02").unwrap(),
            0,
            PrivateKey::generate(SignatureAlgorithm::EcdsaP256),
            HashAlgorithm::Sha2_256,
        ));
        assert_eq!(signer.sign(b"x").await.unwrap().len(), 64);
        assert_eq!(signer.address().to_hex(), "0000000000000002");
    }
}
