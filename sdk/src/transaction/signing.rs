//! The signing coordinator.
//!
//! Two phases, always in this order:
//!
//! 1. **Payload.** Every payload signer (proposer and authorizers, minus the
//!    payer) signs [`Transaction::signable_payload`].
//! 2. **Envelope.** The payer signs [`Transaction::signable_envelope`], which
//!    now embeds the payload signatures.
//!
//! Each phase returns a new [`Transaction`]; the input is never touched, so a
//! failure halfway leaves the caller holding the last good value. Signers run
//! one after another: hardware and remote backends usually cannot take
//! concurrent requests, and the payload bytes are shared by all of them
//! anyway.
//!
//! [`sign_payload`] and [`sign_envelope`] can be called by different parties
//! on different machines, with the transaction passed between them as JSON.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::builder::Transaction;
use super::types::TransactionSignature;
use crate::crypto::signer::{Signer, SigningError};
use crate::error::Result;
use crate::types::Address;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Payload,
    Envelope,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload => write!(f, "payload"),
            Self::Envelope => write!(f, "envelope"),
        }
    }
}

/// Runs the payload phase with whichever of `signers` belong to payload
/// signers. Accounts with no matching signer are left unsigned, so this also
/// serves a co-signer who holds only some of the keys.
pub async fn sign_payload(tx: &Transaction, signers: &[Arc<dyn Signer>]) -> Result<Transaction> {
    let message = tx.signable_payload();
    let mut signed = tx.clone();
    for address in tx.payload_signers() {
        for signer in signers.iter().filter(|s| s.address() == address) {
            let record = produce(tx, signer.as_ref(), &message, Phase::Payload).await?;
            signed = signed.add_payload_signature(record)?;
        }
    }
    Ok(signed)
}

/// Runs the envelope phase. At least one of `signers` must belong to the
/// payer.
pub async fn sign_envelope(tx: &Transaction, signers: &[Arc<dyn Signer>]) -> Result<Transaction> {
    let payer = tx.payer();
    let payer_signers: Vec<&Arc<dyn Signer>> =
        signers.iter().filter(|s| s.address() == payer).collect();
    if payer_signers.is_empty() {
        return Err(SigningError::MissingSigner { address: payer }.into());
    }

    let message = tx.signable_envelope();
    let mut signed = tx.clone();
    for signer in payer_signers {
        let record = produce(tx, signer.as_ref(), &message, Phase::Envelope).await?;
        signed = signed.add_envelope_signature(record)?;
    }
    Ok(signed)
}

/// Both phases. Fails with [`SigningError::MissingSigner`] if any payload
/// signer or the payer has no signer in `signers`.
pub async fn sign(tx: &Transaction, signers: &[Arc<dyn Signer>]) -> Result<Transaction> {
    let payload_signed = sign_payload(tx, signers).await?;
    if let Some(address) = first_unsigned(&payload_signed) {
        return Err(SigningError::MissingSigner { address }.into());
    }
    sign_envelope(&payload_signed, signers).await
}

fn first_unsigned(tx: &Transaction) -> Option<Address> {
    tx.payload_signers().into_iter().find(|address| {
        !tx.payload_signatures()
            .iter()
            .any(|s| s.address == *address)
    })
}

async fn produce(
    tx: &Transaction,
    signer: &dyn Signer,
    message: &[u8],
    phase: Phase,
) -> Result<TransactionSignature> {
    let address = signer.address();
    let signer_index = tx
        .signer_index(address)
        .ok_or(SigningError::MissingSigner { address })?;
    let signature = signer.sign(message).await?;
    debug!(
        %address,
        key_index = signer.key_index(),
        signer_index,
        %phase,
        "signature produced"
    );
    Ok(TransactionSignature::new(
        address,
        signer_index,
        signer.key_index(),
        signature,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::crypto::{verify_signature, HashAlgorithm, InMemorySigner, PrivateKey, SignatureAlgorithm};
    use crate::error::Error;
    use crate::transaction::{ProposalKey, TransactionBuilder};

    fn addr(s: &str) -> Address {
        Address::from_hex(s).unwrap()
    }

    fn signer(address: &str, key_index: u32) -> Arc<InMemorySigner> {
        Arc::new(InMemorySigner::new(
            addr(address),
            key_index,
            PrivateKey::generate(SignatureAlgorithm::EcdsaP256),
            HashAlgorithm::Sha3_256,
        ))
    }

    fn three_party_tx() -> Transaction {
        TransactionBuilder::new()
            .script("transaction {}")
            .proposal_key(ProposalKey::new(addr("02"), 0, 5u64))
            .payer(addr("01"))
            .authorizers(vec![addr("03"), addr("02")])
            .build()
    }

    struct BrokenSigner;

    #[async_trait]
    impl Signer for BrokenSigner {
        fn address(&self) -> Address {
            Address::from_hex("02").unwrap()
        }
        fn key_index(&self) -> u32 {
            0
        }
        fn hash_algorithm(&self) -> HashAlgorithm {
            HashAlgorithm::Sha2_256
        }
        fn signature_algorithm(&self) -> SignatureAlgorithm {
            SignatureAlgorithm::EcdsaP256
        }
        async fn sign(&self, _message: &[u8]) -> std::result::Result<Vec<u8>, SigningError> {
            Err(SigningError::Backend("device unplugged".into()))
        }
    }

    /// Wraps a signer and logs which account was asked to sign.
    struct Recording {
        inner: Arc<InMemorySigner>,
        log: Arc<std::sync::Mutex<Vec<Address>>>,
    }

    #[async_trait]
    impl Signer for Recording {
        fn address(&self) -> Address {
            self.inner.address()
        }
        fn key_index(&self) -> u32 {
            self.inner.key_index()
        }
        fn hash_algorithm(&self) -> HashAlgorithm {
            self.inner.hash_algorithm()
        }
        fn signature_algorithm(&self) -> SignatureAlgorithm {
            self.inner.signature_algorithm()
        }
        async fn sign(&self, message: &[u8]) -> std::result::Result<Vec<u8>, SigningError> {
            self.log.lock().unwrap().push(self.address());
            self.inner.sign(message).await
        }
    }

    #[tokio::test]
    async fn signers_run_in_canonical_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recording = |address: &str| -> Arc<dyn Signer> {
            Arc::new(Recording {
                inner: signer(address, 0),
                log: Arc::clone(&log),
            })
        };
        // Supplied in reverse; invocation follows the transaction.
        let signers = vec![recording("01"), recording("02"), recording("03")];

        sign(&three_party_tx(), &signers).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![addr("03"), addr("02"), addr("01")]);

        log.lock().unwrap().clear();
        let distinct_proposer = TransactionBuilder::new()
            .proposal_key(ProposalKey::new(addr("02"), 0, 0u64))
            .payer(addr("01"))
            .authorizer(addr("03"))
            .build();
        sign(&distinct_proposer, &signers).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![addr("02"), addr("03"), addr("01")]);
    }

    #[tokio::test]
    async fn full_signing_produces_valid_signatures() {
        let payer = signer("01", 0);
        let proposer = signer("02", 0);
        let authorizer = signer("03", 1);
        let signers: Vec<Arc<dyn Signer>> =
            vec![payer.clone(), authorizer.clone(), proposer.clone()];

        let tx = three_party_tx();
        let signed = sign(&tx, &signers).await.unwrap();

        assert!(signed.is_submission_ready());
        assert_eq!(signed.payload_signatures().len(), 2);
        assert_eq!(signed.envelope_signatures().len(), 1);

        let envelope_sig = &signed.envelope_signatures()[0];
        assert_eq!(envelope_sig.signer_index, 1);
        assert!(verify_signature(
            SignatureAlgorithm::EcdsaP256,
            HashAlgorithm::Sha3_256,
            &payer.public_key(),
            &signed.signable_envelope(),
            &envelope_sig.signature,
        ));

        let proposer_sig = signed
            .payload_signatures()
            .iter()
            .find(|s| s.address == addr("02"))
            .unwrap();
        assert_eq!(proposer_sig.signer_index, 0);
        assert!(verify_signature(
            SignatureAlgorithm::EcdsaP256,
            HashAlgorithm::Sha3_256,
            &proposer.public_key(),
            &tx.signable_payload(),
            &proposer_sig.signature,
        ));
    }

    #[tokio::test]
    async fn input_is_not_mutated() {
        let tx = three_party_tx();
        let signers: Vec<Arc<dyn Signer>> = vec![signer("02", 0)];
        let _ = sign_payload(&tx, &signers).await.unwrap();
        assert!(tx.payload_signatures().is_empty());
    }

    #[tokio::test]
    async fn missing_payload_signer_is_reported() {
        let signers: Vec<Arc<dyn Signer>> = vec![signer("01", 0), signer("02", 0)];
        let err = sign(&three_party_tx(), &signers).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Signing(SigningError::MissingSigner { address }) if address == addr("03")
        ));
    }

    #[tokio::test]
    async fn missing_payer_is_reported() {
        let signers: Vec<Arc<dyn Signer>> = vec![signer("02", 0), signer("03", 0)];
        let err = sign(&three_party_tx(), &signers).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Signing(SigningError::MissingSigner { address }) if address == addr("01")
        ));
    }

    #[tokio::test]
    async fn backend_failure_aborts_attempt() {
        let signers: Vec<Arc<dyn Signer>> = vec![Arc::new(BrokenSigner), signer("03", 0)];
        let err = sign_payload(&three_party_tx(), &signers).await.unwrap_err();
        assert!(matches!(err, Error::Signing(SigningError::Backend(_))));
    }

    #[tokio::test]
    async fn payer_as_proposer_signs_envelope_only() {
        let account = addr("01");
        let tx = TransactionBuilder::new()
            .proposal_key(ProposalKey::new(account, 0, 0u64))
            .payer(account)
            .authorizer(account)
            .build();
        let signers: Vec<Arc<dyn Signer>> = vec![signer("01", 0)];
        let signed = sign(&tx, &signers).await.unwrap();
        assert!(signed.payload_signatures().is_empty());
        assert_eq!(signed.envelope_signatures().len(), 1);
    }

    #[tokio::test]
    async fn multiple_keys_for_one_account_all_sign() {
        let signers: Vec<Arc<dyn Signer>> =
            vec![signer("02", 1), signer("02", 0), signer("03", 0), signer("01", 0)];
        let signed = sign(&three_party_tx(), &signers).await.unwrap();
        assert_eq!(signed.payload_signatures().len(), 3);
    }

    #[tokio::test]
    async fn split_phases_match_single_pass() {
        // RFC 6979 makes ECDSA deterministic, so both paths sign identical
        // bytes and produce identical signatures.
        let signers: Vec<Arc<dyn Signer>> = vec![signer("01", 0), signer("02", 0), signer("03", 0)];
        let tx = three_party_tx();

        let one_pass = sign(&tx, &signers).await.unwrap();

        let partial = sign_payload(&tx, &signers).await.unwrap();
        let json = serde_json::to_string(&partial).unwrap();
        let resumed: Transaction = serde_json::from_str(&json).unwrap();
        let two_pass = sign_envelope(&resumed, &signers).await.unwrap();

        assert_eq!(two_pass.signable_envelope(), one_pass.signable_envelope());
        assert_eq!(two_pass.id(), one_pass.id());
    }
}
