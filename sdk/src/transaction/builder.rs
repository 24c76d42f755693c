//! The transaction entity, its canonical encoding, and the builder.
//!
//! A [`Transaction`] is an immutable value. Every "setter" is a `with_*`
//! method returning a new transaction, so a value that has already been
//! signed can never change under its signatures by accident.
//!
//! # Canonical byte format
//!
//! ```text
//! payload  = rlp([script, [arg...], ref_block_id, gas_limit,
//!                 proposer, proposer_key_index, proposer_seq,
//!                 payer, [authorizer...]])
//! sigs     = rlp([[signer_index, key_index, signature]...])  sorted
//! envelope = rlp([payload, payload_sigs])
//!
//! signable payload  = TRANSACTION_DOMAIN_TAG || payload
//! signable envelope = TRANSACTION_DOMAIN_TAG || envelope
//! id                = sha3_256(rlp([payload, payload_sigs, envelope_sigs]))
//! ```
//!
//! The signer index written into a signature entry is always recomputed from
//! the record's address against [`Transaction::signers`]; the index stored on
//! the record is ignored. Entries are sorted by `(signer_index, key_index)`
//! before encoding, so callers may collect signatures in any order.

use num_bigint::BigUint;
use rlp::RlpStream;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::{ProposalKey, TransactionSignature};
use crate::config::DEFAULT_GAS_LIMIT;
use crate::crypto::hash::sha3_256;
use crate::crypto::signer::SigningError;
use crate::encoding::{
    append_bytes, append_unsigned, decimal, with_domain_tag, TRANSACTION_DOMAIN_TAG,
};
use crate::types::{Address, Id};
use crate::value::Argument;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transaction at any stage of its life: unsigned, partially signed, or
/// ready for submission.
///
/// Serializes to JSON losslessly, so a partially signed value can be handed
/// to a co-signer and picked up again later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    script: String,
    #[serde(default)]
    arguments: Vec<Argument>,
    reference_block_id: Id,
    #[serde(with = "decimal")]
    gas_limit: BigUint,
    proposal_key: ProposalKey,
    payer: Address,
    #[serde(default)]
    authorizers: Vec<Address>,
    #[serde(default)]
    payload_signatures: Vec<TransactionSignature>,
    #[serde(default)]
    envelope_signatures: Vec<TransactionSignature>,
}

impl Transaction {
    /// Starts a [`TransactionBuilder`].
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::new()
    }

    /// Cadence source text.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Encoded arguments, in declaration order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Block the transaction's expiry window is measured from.
    pub fn reference_block_id(&self) -> Id {
        self.reference_block_id
    }

    /// Maximum computation the payer will pay for.
    pub fn gas_limit(&self) -> &BigUint {
        &self.gas_limit
    }

    /// Proposer key and its expected sequence number.
    pub fn proposal_key(&self) -> &ProposalKey {
        &self.proposal_key
    }

    /// Paying account.
    pub fn payer(&self) -> Address {
        self.payer
    }

    /// Authorizing accounts, in declaration order.
    pub fn authorizers(&self) -> &[Address] {
        &self.authorizers
    }

    /// Signatures over the payload.
    pub fn payload_signatures(&self) -> &[TransactionSignature] {
        &self.payload_signatures
    }

    /// Signatures over the envelope.
    pub fn envelope_signatures(&self) -> &[TransactionSignature] {
        &self.envelope_signatures
    }

    // -- Signer lists -------------------------------------------------------

    /// Every distinct signing account: proposer, payer, then authorizers,
    /// first occurrence wins. A signature's signer index is its address's
    /// position in this list.
    pub fn signers(&self) -> Vec<Address> {
        let mut out = Vec::with_capacity(2 + self.authorizers.len());
        let candidates = [self.proposal_key.address, self.payer]
            .into_iter()
            .chain(self.authorizers.iter().copied());
        for address in candidates {
            if !out.contains(&address) {
                out.push(address);
            }
        }
        out
    }

    /// Accounts that sign the payload, deduplicated, with the payer removed
    /// (the payer signs the envelope). A proposer that is not also an
    /// authorizer comes first; otherwise the authorizers' declared order
    /// decides.
    pub fn payload_signers(&self) -> Vec<Address> {
        let mut out = Vec::with_capacity(1 + self.authorizers.len());
        let proposer = self.proposal_key.address;
        let lead = (!self.authorizers.contains(&proposer)).then_some(proposer);
        let candidates = lead.into_iter().chain(self.authorizers.iter().copied());
        for address in candidates {
            if address != self.payer && !out.contains(&address) {
                out.push(address);
            }
        }
        out
    }

    /// Position of `address` in [`Transaction::signers`].
    pub fn signer_index(&self, address: Address) -> Option<u32> {
        self.signers()
            .iter()
            .position(|a| *a == address)
            .map(|i| i as u32)
    }

    /// `true` once every payload signer has a payload signature and the payer
    /// has an envelope signature.
    pub fn is_submission_ready(&self) -> bool {
        let payer_signed = self
            .envelope_signatures
            .iter()
            .any(|s| s.address == self.payer);
        payer_signed
            && self.payload_signers().iter().all(|address| {
                self.payload_signatures
                    .iter()
                    .any(|s| s.address == *address)
            })
    }

    // -- Canonical encoding -------------------------------------------------

    /// Domain-tagged payload bytes that proposer and authorizers sign.
    pub fn signable_payload(&self) -> Vec<u8> {
        with_domain_tag(&TRANSACTION_DOMAIN_TAG, &self.payload_rlp())
    }

    /// Domain-tagged envelope bytes that the payer signs. Embeds the current
    /// payload signatures.
    pub fn signable_envelope(&self) -> Vec<u8> {
        with_domain_tag(&TRANSACTION_DOMAIN_TAG, &self.envelope_rlp())
    }

    /// Undecorated RLP of the payload field list.
    pub fn payload_rlp(&self) -> Vec<u8> {
        let mut s = RlpStream::new();
        self.append_payload(&mut s);
        s.out().to_vec()
    }

    /// Undecorated RLP of `[payload, payload_signatures]`.
    pub fn envelope_rlp(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(2);
        self.append_payload(&mut s);
        self.append_signatures(&mut s, &self.payload_signatures);
        s.out().to_vec()
    }

    /// Transaction id, as the chain computes it.
    pub fn id(&self) -> Id {
        let mut s = RlpStream::new_list(3);
        self.append_payload(&mut s);
        self.append_signatures(&mut s, &self.payload_signatures);
        self.append_signatures(&mut s, &self.envelope_signatures);
        Id::new(sha3_256(&s.out()))
    }

    fn append_payload(&self, s: &mut RlpStream) {
        s.begin_list(9);
        append_bytes(s, self.script.as_bytes());
        s.begin_list(self.arguments.len());
        for argument in &self.arguments {
            append_bytes(s, argument.as_bytes());
        }
        append_bytes(s, self.reference_block_id.as_bytes());
        append_unsigned(s, &self.gas_limit);
        append_bytes(s, self.proposal_key.address.as_bytes());
        s.append(&self.proposal_key.key_index);
        append_unsigned(s, &self.proposal_key.sequence_number);
        append_bytes(s, self.payer.as_bytes());
        s.begin_list(self.authorizers.len());
        for authorizer in &self.authorizers {
            append_bytes(s, authorizer.as_bytes());
        }
    }

    fn append_signatures(&self, s: &mut RlpStream, records: &[TransactionSignature]) {
        let signers = self.signers();
        let mut entries: Vec<(u32, u32, &[u8])> = records
            .iter()
            .filter_map(|record| {
                match signers.iter().position(|a| *a == record.address) {
                    Some(index) => Some((index as u32, record.key_index, record.signature.as_slice())),
                    None => {
                        warn!(
                            address = %record.address,
                            key_index = record.key_index,
                            "signature from an account that is not a signer, dropped from encoding"
                        );
                        None
                    }
                }
            })
            .collect();
        entries.sort();

        s.begin_list(entries.len());
        for (signer_index, key_index, signature) in entries {
            s.begin_list(3);
            s.append(&signer_index);
            s.append(&key_index);
            append_bytes(s, signature);
        }
    }

    // -- Derived copies -----------------------------------------------------

    /// Copy with a different script.
    pub fn with_script(&self, script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            ..self.clone()
        }
    }

    /// Copy with different arguments.
    pub fn with_arguments(&self, arguments: Vec<Argument>) -> Self {
        Self {
            arguments,
            ..self.clone()
        }
    }

    /// Copy with a different reference block.
    pub fn with_reference_block_id(&self, reference_block_id: Id) -> Self {
        Self {
            reference_block_id,
            ..self.clone()
        }
    }

    /// Copy with a different gas limit.
    pub fn with_gas_limit(&self, gas_limit: impl Into<BigUint>) -> Self {
        Self {
            gas_limit: gas_limit.into(),
            ..self.clone()
        }
    }

    /// Copy with a different proposal key.
    pub fn with_proposal_key(&self, proposal_key: ProposalKey) -> Self {
        Self {
            proposal_key,
            ..self.clone()
        }
    }

    /// Copy with a different payer.
    pub fn with_payer(&self, payer: Address) -> Self {
        Self {
            payer,
            ..self.clone()
        }
    }

    /// Copy with different authorizers.
    pub fn with_authorizers(&self, authorizers: Vec<Address>) -> Self {
        Self {
            authorizers,
            ..self.clone()
        }
    }

    /// Copy with the payload signature set replaced.
    pub fn with_payload_signatures(&self, payload_signatures: Vec<TransactionSignature>) -> Self {
        Self {
            payload_signatures,
            ..self.clone()
        }
    }

    /// Copy with the envelope signature set replaced.
    pub fn with_envelope_signatures(&self, envelope_signatures: Vec<TransactionSignature>) -> Self {
        Self {
            envelope_signatures,
            ..self.clone()
        }
    }

    /// Copy with `record` added to the payload set. An existing record for
    /// the same `(address, key_index)` is replaced.
    ///
    /// Fails with [`SigningError::NotASigner`] if `record.address` is not in
    /// [`Transaction::signers`]; such a record could never be encoded.
    pub fn add_payload_signature(
        &self,
        record: TransactionSignature,
    ) -> Result<Self, SigningError> {
        self.ensure_signer(record.address)?;
        let mut payload_signatures = self.payload_signatures.clone();
        upsert(&mut payload_signatures, record);
        Ok(self.with_payload_signatures(payload_signatures))
    }

    /// Copy with `record` added to the envelope set, replacing any record
    /// for the same `(address, key_index)`.
    pub fn add_envelope_signature(
        &self,
        record: TransactionSignature,
    ) -> Result<Self, SigningError> {
        self.ensure_signer(record.address)?;
        let mut envelope_signatures = self.envelope_signatures.clone();
        upsert(&mut envelope_signatures, record);
        Ok(self.with_envelope_signatures(envelope_signatures))
    }

    fn ensure_signer(&self, address: Address) -> Result<(), SigningError> {
        match self.signer_index(address) {
            Some(_) => Ok(()),
            None => Err(SigningError::NotASigner { address }),
        }
    }
}

fn upsert(set: &mut Vec<TransactionSignature>, record: TransactionSignature) {
    match set
        .iter_mut()
        .find(|s| s.address == record.address && s.key_index == record.key_index)
    {
        Some(existing) => *existing = record,
        None => set.push(record),
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for an unsigned [`Transaction`].
///
/// ```rust
/// use flow_sdk::transaction::{ProposalKey, TransactionBuilder};
/// use flow_sdk::types::Address;
///
/// let account = Address::from_hex("f8d6e0586b0a20c7").unwrap();
/// let tx = TransactionBuilder::new()
///     .script("transaction { execute { log(\"hi\") } }")
///     .gas_limit(100u64)
///     .proposal_key(ProposalKey::new(account, 0, 7u64))
///     .payer(account)
///     .authorizer(account)
///     .build();
/// assert_eq!(tx.signers(), vec![account]);
/// ```
///
/// Defaults: empty script, no arguments, zero reference block, gas limit
/// [`DEFAULT_GAS_LIMIT`], zero proposal key and payer, no authorizers.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    script: String,
    arguments: Vec<Argument>,
    reference_block_id: Id,
    gas_limit: BigUint,
    proposal_key: ProposalKey,
    payer: Address,
    authorizers: Vec<Address>,
}

impl TransactionBuilder {
    /// Creates a builder with the defaults above.
    pub fn new() -> Self {
        Self {
            script: String::new(),
            arguments: Vec::new(),
            reference_block_id: Id::ZERO,
            gas_limit: BigUint::from(DEFAULT_GAS_LIMIT),
            proposal_key: ProposalKey::default(),
            payer: Address::default(),
            authorizers: Vec::new(),
        }
    }

    /// Sets the Cadence source.
    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    /// Appends one argument.
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Replaces all arguments.
    pub fn arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the reference block.
    pub fn reference_block_id(mut self, id: Id) -> Self {
        self.reference_block_id = id;
        self
    }

    /// Sets the gas limit.
    pub fn gas_limit(mut self, gas_limit: impl Into<BigUint>) -> Self {
        self.gas_limit = gas_limit.into();
        self
    }

    /// Sets the proposal key.
    pub fn proposal_key(mut self, proposal_key: ProposalKey) -> Self {
        self.proposal_key = proposal_key;
        self
    }

    /// Sets the payer.
    pub fn payer(mut self, payer: Address) -> Self {
        self.payer = payer;
        self
    }

    /// Appends one authorizer.
    pub fn authorizer(mut self, authorizer: Address) -> Self {
        self.authorizers.push(authorizer);
        self
    }

    /// Replaces all authorizers.
    pub fn authorizers(mut self, authorizers: Vec<Address>) -> Self {
        self.authorizers = authorizers;
        self
    }

    /// Produces the unsigned transaction.
    pub fn build(self) -> Transaction {
        Transaction {
            script: self.script,
            arguments: self.arguments,
            reference_block_id: self.reference_block_id,
            gas_limit: self.gas_limit,
            proposal_key: self.proposal_key,
            payer: self.payer,
            authorizers: self.authorizers,
            payload_signatures: Vec::new(),
            envelope_signatures: Vec::new(),
        }
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn addr(s: &str) -> Address {
        Address::from_hex(s).unwrap()
    }

    fn sample_tx() -> Transaction {
        TransactionBuilder::new()
            .script("transaction { execute { log(\"Hello, World!\") } }")
            .reference_block_id(
                Id::from_hex("f0e4c2f76c58916ec258f246851bea091d14d4247a2fc3e18694461b1816e13b")
                    .unwrap(),
            )
            .gas_limit(42u64)
            .proposal_key(ProposalKey::new(addr("01"), 4, 10u64))
            .payer(addr("01"))
            .authorizer(addr("01"))
            .build()
    }

    #[test]
    fn builder_defaults() {
        let tx = TransactionBuilder::new().build();
        assert_eq!(tx.script(), "");
        assert_eq!(tx.gas_limit(), &BigUint::from(DEFAULT_GAS_LIMIT));
        assert!(tx.reference_block_id().is_zero());
        assert!(tx.payload_signatures().is_empty());
    }

    #[test]
    fn payload_starts_with_domain_tag() {
        let bytes = sample_tx().signable_payload();
        assert_eq!(&bytes[..32], &TRANSACTION_DOMAIN_TAG);
        assert_eq!(bytes[32], 0xf8);
    }

    #[test]
    fn signers_are_deduplicated_in_order() {
        let tx = TransactionBuilder::new()
            .proposal_key(ProposalKey::new(addr("02"), 0, 0u64))
            .payer(addr("01"))
            .authorizers(vec![addr("03"), addr("02"), addr("01")])
            .build();
        assert_eq!(tx.signers(), vec![addr("02"), addr("01"), addr("03")]);
        // The proposer is also an authorizer, so declared order applies.
        assert_eq!(tx.payload_signers(), vec![addr("03"), addr("02")]);
        assert_eq!(tx.signer_index(addr("03")), Some(2));
        assert_eq!(tx.signer_index(addr("04")), None);
    }

    #[test]
    fn distinct_proposer_signs_payload_first() {
        let tx = TransactionBuilder::new()
            .proposal_key(ProposalKey::new(addr("04"), 0, 0u64))
            .payer(addr("01"))
            .authorizers(vec![addr("03"), addr("02"), addr("03")])
            .build();
        assert_eq!(tx.payload_signers(), vec![addr("04"), addr("03"), addr("02")]);
    }

    #[test]
    fn stray_signature_is_rejected() {
        let stray = TransactionSignature::new(addr("09"), 0, 0, vec![7]);
        let tx = sample_tx();
        assert_eq!(
            tx.add_payload_signature(stray.clone()),
            Err(SigningError::NotASigner { address: addr("09") })
        );
        assert_eq!(
            tx.add_envelope_signature(stray),
            Err(SigningError::NotASigner { address: addr("09") })
        );
    }

    #[test]
    fn signature_order_does_not_change_encoding() {
        let a = TransactionSignature::new(addr("01"), 0, 1, vec![1]);
        let b = TransactionSignature::new(addr("01"), 0, 0, vec![2]);
        let tx1 = sample_tx().with_payload_signatures(vec![a.clone(), b.clone()]);
        let tx2 = sample_tx().with_payload_signatures(vec![b, a]);
        assert_eq!(tx1.signable_envelope(), tx2.signable_envelope());
        assert_eq!(tx1.id(), tx2.id());
    }

    #[test]
    fn unknown_signer_is_dropped_from_encoding() {
        let stray = TransactionSignature::new(addr("09"), 0, 0, vec![7]);
        let tx = sample_tx().with_payload_signatures(vec![stray]);
        assert_eq!(tx.signable_envelope(), sample_tx().signable_envelope());
        // Still carried on the value itself.
        assert_eq!(tx.payload_signatures().len(), 1);
    }

    #[test]
    fn with_copies_leave_original_untouched() {
        let tx = sample_tx();
        let changed = tx.with_gas_limit(0u64);
        assert_eq!(tx.gas_limit(), &BigUint::from(42u32));
        assert!(changed.gas_limit().bits() == 0);
        assert_ne!(tx.signable_payload(), changed.signable_payload());
    }

    #[test]
    fn with_copies_keep_signatures() {
        let sig = TransactionSignature::new(addr("01"), 0, 4, vec![9; 64]);
        let tx = sample_tx().add_payload_signature(sig.clone()).unwrap();
        assert_eq!(tx.with_script("").payload_signatures(), &[sig]);
    }

    #[test]
    fn add_signature_replaces_same_key() {
        let tx = sample_tx()
            .add_envelope_signature(TransactionSignature::new(addr("01"), 0, 4, vec![1]))
            .unwrap()
            .add_envelope_signature(TransactionSignature::new(addr("01"), 0, 4, vec![2]))
            .unwrap()
            .add_envelope_signature(TransactionSignature::new(addr("01"), 0, 5, vec![3]))
            .unwrap();
        assert_eq!(tx.envelope_signatures().len(), 2);
        assert_eq!(tx.envelope_signatures()[0].signature, vec![2]);
    }

    #[test]
    fn id_depends_on_signatures() {
        let tx = sample_tx();
        let signed = tx
            .add_envelope_signature(TransactionSignature::new(addr("01"), 0, 4, vec![1; 64]))
            .unwrap();
        assert_ne!(tx.id(), signed.id());
        assert_eq!(signed.id(), signed.clone().id());
    }

    #[test]
    fn submission_ready_requires_both_phases() {
        let tx = TransactionBuilder::new()
            .proposal_key(ProposalKey::new(addr("02"), 0, 0u64))
            .payer(addr("01"))
            .authorizer(addr("02"))
            .build();
        assert!(!tx.is_submission_ready());

        let tx = tx
            .add_payload_signature(TransactionSignature::new(addr("02"), 0, 0, vec![1]))
            .unwrap();
        assert!(!tx.is_submission_ready());

        let tx = tx
            .add_envelope_signature(TransactionSignature::new(addr("01"), 1, 0, vec![2]))
            .unwrap();
        assert!(tx.is_submission_ready());
    }

    #[test]
    fn arguments_are_embedded_verbatim() {
        let arg = Value::UInt64(7).to_argument().unwrap();
        let tx = sample_tx().with_arguments(vec![arg.clone()]);
        let payload = tx.payload_rlp();
        let needle = arg.as_bytes();
        assert!(payload.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn json_round_trip_preserves_encoding() {
        let tx = sample_tx()
            .with_arguments(vec![Value::string("hi").to_argument().unwrap()])
            .add_payload_signature(TransactionSignature::new(addr("01"), 0, 4, vec![5; 64]))
            .unwrap();
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
        assert_eq!(back.signable_envelope(), tx.signable_envelope());
    }
}
