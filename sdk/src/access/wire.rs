//! REST request and response bodies.
//!
//! The access node's REST API sends every 64-bit integer as a decimal string,
//! every blob as base64 and addresses as bare hex. These DTOs mirror that
//! exactly and convert into the public models, turning any malformed field
//! into [`ChainAccessError::Decode`].

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::models::{
    Account, AccountKey, Block, BlockHeader, BlockSeal, Collection, CollectionGuarantee, Event,
    EventResult,
};
use super::ChainAccessError;
use crate::crypto::{HashAlgorithm, SignatureAlgorithm};
use crate::transaction::{
    ProposalKey, Transaction, TransactionBuilder, TransactionResult, TransactionSignature,
    TransactionStatus,
};
use crate::types::{Address, Id};
use crate::value::Argument;

/// Integers carried as decimal strings.
mod stringified {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

fn decode_err(what: &str, e: impl std::fmt::Display) -> ChainAccessError {
    ChainAccessError::Decode(format!("{what}: {e}"))
}

fn from_base64(what: &str, s: &str) -> Result<Vec<u8>, ChainAccessError> {
    BASE64.decode(s).map_err(|e| decode_err(what, e))
}

// ---------------------------------------------------------------------------
// Errors and network
// ---------------------------------------------------------------------------

/// Error body of a non-2xx reply.
#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireNetworkParameters {
    pub chain_id: String,
}

// ---------------------------------------------------------------------------
// Blocks and collections
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireBlock {
    pub header: WireBlockHeader,
    #[serde(default)]
    pub payload: Option<WireBlockPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBlockHeader {
    pub id: Id,
    pub parent_id: Id,
    #[serde(with = "stringified")]
    pub height: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireBlockPayload {
    #[serde(default)]
    pub collection_guarantees: Vec<WireCollectionGuarantee>,
    #[serde(default)]
    pub block_seals: Vec<WireBlockSeal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCollectionGuarantee {
    pub collection_id: Id,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBlockSeal {
    pub block_id: Id,
    pub result_id: Id,
}

impl From<WireBlockHeader> for BlockHeader {
    fn from(w: WireBlockHeader) -> Self {
        BlockHeader {
            id: w.id,
            parent_id: w.parent_id,
            height: w.height,
            timestamp: w.timestamp,
        }
    }
}

impl WireBlock {
    pub fn into_block(self) -> Result<Block, ChainAccessError> {
        let payload = self
            .payload
            .ok_or_else(|| ChainAccessError::Decode("block payload was not expanded".into()))?;
        Ok(Block {
            header: self.header.into(),
            collection_guarantees: payload
                .collection_guarantees
                .into_iter()
                .map(|g| CollectionGuarantee {
                    collection_id: g.collection_id,
                })
                .collect(),
            block_seals: payload
                .block_seals
                .into_iter()
                .map(|s| BlockSeal {
                    block_id: s.block_id,
                    result_id: s.result_id,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCollection {
    pub id: Id,
    #[serde(default)]
    pub transactions: Vec<WireIdOnly>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireIdOnly {
    pub id: Id,
}

impl From<WireCollection> for Collection {
    fn from(w: WireCollection) -> Self {
        Collection {
            id: w.id,
            transaction_ids: w.transactions.into_iter().map(|t| t.id).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireAccount {
    pub address: Address,
    #[serde(with = "stringified")]
    pub balance: u64,
    #[serde(default)]
    pub keys: Vec<WireAccountKey>,
    #[serde(default)]
    pub contracts: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAccountKey {
    #[serde(with = "stringified")]
    pub index: u32,
    pub public_key: String,
    pub signing_algorithm: String,
    pub hashing_algorithm: String,
    #[serde(with = "stringified")]
    pub sequence_number: BigUint,
    #[serde(with = "stringified")]
    pub weight: u32,
    #[serde(default)]
    pub revoked: bool,
}

impl WireAccount {
    pub fn into_account(self) -> Result<Account, ChainAccessError> {
        let keys = self
            .keys
            .into_iter()
            .map(|k| {
                let public_key = hex::decode(k.public_key.trim_start_matches("0x"))
                    .map_err(|e| decode_err("public_key", e))?;
                Ok(AccountKey {
                    index: k.index,
                    public_key,
                    sign_algo: k
                        .signing_algorithm
                        .parse::<SignatureAlgorithm>()
                        .map_err(|e| decode_err("signing_algorithm", e))?,
                    hash_algo: k
                        .hashing_algorithm
                        .parse::<HashAlgorithm>()
                        .map_err(|e| decode_err("hashing_algorithm", e))?,
                    weight: k.weight,
                    sequence_number: k.sequence_number,
                    revoked: k.revoked,
                })
            })
            .collect::<Result<Vec<_>, ChainAccessError>>()?;

        let contracts = self
            .contracts
            .into_iter()
            .map(|(name, code)| {
                let bytes = from_base64("contract code", &code)?;
                let text = String::from_utf8(bytes).map_err(|e| decode_err("contract code", e))?;
                Ok((name, text))
            })
            .collect::<Result<BTreeMap<_, _>, ChainAccessError>>()?;

        Ok(Account {
            address: self.address,
            balance: self.balance,
            keys,
            contracts,
        })
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireProposalKey {
    pub address: String,
    #[serde(with = "stringified")]
    pub key_index: u32,
    #[serde(with = "stringified")]
    pub sequence_number: BigUint,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireSignature {
    pub address: String,
    #[serde(with = "stringified")]
    pub key_index: u32,
    pub signature: String,
}

/// Transaction body, both for submission and for lookups.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireTransaction {
    pub script: String,
    pub arguments: Vec<String>,
    pub reference_block_id: String,
    #[serde(with = "stringified")]
    pub gas_limit: BigUint,
    pub payer: String,
    pub proposal_key: WireProposalKey,
    pub authorizers: Vec<String>,
    pub payload_signatures: Vec<WireSignature>,
    pub envelope_signatures: Vec<WireSignature>,
}

// Records the encoder would skip are not sent either, so the node computes
// the same id as `Transaction::id`.
fn wire_signatures(tx: &Transaction, records: &[TransactionSignature]) -> Vec<WireSignature> {
    records
        .iter()
        .filter(|s| tx.signer_index(s.address).is_some())
        .map(|s| WireSignature {
            address: s.address.to_hex(),
            key_index: s.key_index,
            signature: BASE64.encode(&s.signature),
        })
        .collect()
}

fn parse_address(s: &str) -> Result<Address, ChainAccessError> {
    Address::from_hex(s).map_err(|e| decode_err("address", e))
}

impl From<&Transaction> for WireTransaction {
    fn from(tx: &Transaction) -> Self {
        WireTransaction {
            script: BASE64.encode(tx.script()),
            arguments: tx
                .arguments()
                .iter()
                .map(|a| BASE64.encode(a.as_bytes()))
                .collect(),
            reference_block_id: tx.reference_block_id().to_hex(),
            gas_limit: tx.gas_limit().clone(),
            payer: tx.payer().to_hex(),
            proposal_key: WireProposalKey {
                address: tx.proposal_key().address.to_hex(),
                key_index: tx.proposal_key().key_index,
                sequence_number: tx.proposal_key().sequence_number.clone(),
            },
            authorizers: tx.authorizers().iter().map(Address::to_hex).collect(),
            payload_signatures: wire_signatures(tx, tx.payload_signatures()),
            envelope_signatures: wire_signatures(tx, tx.envelope_signatures()),
        }
    }
}

impl WireTransaction {
    pub fn into_transaction(self) -> Result<Transaction, ChainAccessError> {
        let script = String::from_utf8(from_base64("script", &self.script)?)
            .map_err(|e| decode_err("script", e))?;
        let arguments = self
            .arguments
            .iter()
            .map(|a| from_base64("argument", a).map(Argument::from_bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let authorizers = self
            .authorizers
            .iter()
            .map(|a| parse_address(a))
            .collect::<Result<Vec<_>, _>>()?;

        let tx = TransactionBuilder::new()
            .script(script)
            .arguments(arguments)
            .reference_block_id(
                Id::from_hex(&self.reference_block_id)
                    .map_err(|e| decode_err("reference_block_id", e))?,
            )
            .gas_limit(self.gas_limit)
            .proposal_key(ProposalKey {
                address: parse_address(&self.proposal_key.address)?,
                key_index: self.proposal_key.key_index,
                sequence_number: self.proposal_key.sequence_number,
            })
            .payer(parse_address(&self.payer)?)
            .authorizers(authorizers)
            .build();

        let payload = signatures_from_wire(&tx, &self.payload_signatures)?;
        let envelope = signatures_from_wire(&tx, &self.envelope_signatures)?;
        Ok(tx
            .with_payload_signatures(payload)
            .with_envelope_signatures(envelope))
    }
}

fn signatures_from_wire(
    tx: &Transaction,
    records: &[WireSignature],
) -> Result<Vec<TransactionSignature>, ChainAccessError> {
    records
        .iter()
        .map(|s| {
            let address = parse_address(&s.address)?;
            Ok(TransactionSignature {
                address,
                signer_index: tx.signer_index(address).unwrap_or_default(),
                key_index: s.key_index,
                signature: from_base64("signature", &s.signature)?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Transaction results and events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireTransactionResult {
    #[serde(default)]
    pub block_id: String,
    pub status: String,
    #[serde(default)]
    pub status_code: u32,
    #[serde(default)]
    pub error_message: String,
    #[serde(with = "stringified")]
    pub computation_used: u64,
    #[serde(default)]
    pub events: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub transaction_id: Id,
    #[serde(with = "stringified")]
    pub transaction_index: u32,
    #[serde(with = "stringified")]
    pub event_index: u32,
    pub payload: String,
}

impl WireEvent {
    fn into_event(self) -> Result<Event, ChainAccessError> {
        Ok(Event {
            event_type: self.event_type,
            transaction_id: self.transaction_id,
            transaction_index: self.transaction_index,
            event_index: self.event_index,
            payload: Argument::from_bytes(from_base64("event payload", &self.payload)?),
        })
    }
}

impl WireTransactionResult {
    pub fn into_result(self) -> Result<TransactionResult, ChainAccessError> {
        Ok(TransactionResult {
            status: self
                .status
                .parse::<TransactionStatus>()
                .map_err(|e| decode_err("status", e))?,
            status_code: self.status_code,
            error_message: self.error_message,
            computation_used: self.computation_used,
            block_id: Id::from_hex(&self.block_id).map_err(|e| decode_err("block_id", e))?,
            events: self
                .events
                .into_iter()
                .map(WireEvent::into_event)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBlockEvents {
    pub block_id: Id,
    #[serde(with = "stringified")]
    pub block_height: u64,
    pub block_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub events: Vec<WireEvent>,
}

impl WireBlockEvents {
    pub fn into_event_result(self) -> Result<EventResult, ChainAccessError> {
        Ok(EventResult {
            block_id: self.block_id,
            block_height: self.block_height,
            block_timestamp: self.block_timestamp,
            events: self
                .events
                .into_iter()
                .map(WireEvent::into_event)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct WireScript {
    pub script: String,
    pub arguments: Vec<String>,
}

impl WireScript {
    pub fn new(script: &str, arguments: &[Argument]) -> Self {
        WireScript {
            script: BASE64.encode(script),
            arguments: arguments
                .iter()
                .map(|a| BASE64.encode(a.as_bytes()))
                .collect(),
        }
    }
}

/// Script results arrive as a JSON string holding base64.
pub(crate) fn decode_script_result(encoded: &str) -> Result<Argument, ChainAccessError> {
    from_base64("script result", encoded).map(Argument::from_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_round_trips_through_wire_form() {
        let account = Address::from_hex("f8d6e0586b0a20c7").unwrap();
        let tx = TransactionBuilder::new()
            .script("transaction {}")
            .arguments(vec![Argument::from_bytes(br#"{"type":"Bool","value":true}"#.to_vec())])
            .gas_limit(100u64)
            .proposal_key(ProposalKey::new(account, 0, 12u64))
            .payer(account)
            .authorizer(account)
            .build()
            .add_envelope_signature(TransactionSignature::new(account, 0, 0, vec![7; 64]))
            .unwrap();

        let wire = WireTransaction::from(&tx);
        assert_eq!(wire.payer, "f8d6e0586b0a20c7");
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["gas_limit"], "100");
        assert_eq!(json["proposal_key"]["sequence_number"], "12");

        let back: WireTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(back.into_transaction().unwrap(), tx);
    }

    #[test]
    fn stray_records_are_not_sent() {
        let account = Address::from_hex("f8d6e0586b0a20c7").unwrap();
        let stray = Address::from_hex("01").unwrap();
        let tx = TransactionBuilder::new()
            .proposal_key(ProposalKey::new(account, 0, 0u64))
            .payer(account)
            .build()
            .with_payload_signatures(vec![TransactionSignature::new(stray, 0, 0, vec![1; 64])]);

        let wire = WireTransaction::from(&tx);
        assert!(wire.payload_signatures.is_empty());
        let back = wire.into_transaction().unwrap();
        assert_eq!(back.id(), tx.id());
    }

    #[test]
    fn bad_algorithm_is_a_decode_error() {
        let wire: WireAccount = serde_json::from_str(
            r#"{"address":"01","balance":"0","keys":[{"index":"0","public_key":"00",
                "signing_algorithm":"BLS_BLS12_381","hashing_algorithm":"SHA3_256",
                "sequence_number":"0","weight":"1000","revoked":false}]}"#,
        )
        .unwrap();
        assert!(matches!(wire.into_account(), Err(ChainAccessError::Decode(_))));
    }

    #[test]
    fn pending_result_has_zero_block_id() {
        let wire: WireTransactionResult = serde_json::from_str(
            r#"{"block_id":"","status":"Pending","status_code":0,"error_message":"",
                "computation_used":"0","events":[]}"#,
        )
        .unwrap();
        let result = wire.into_result().unwrap();
        assert_eq!(result.status, TransactionStatus::Pending);
        assert!(result.block_id.is_zero());
    }
}
