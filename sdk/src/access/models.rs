//! Chain-state records returned by the access node.
//!
//! These are transport-independent: the HTTP client decodes its own wire
//! DTOs into them, and an in-process fake can build them directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use rlp::RlpStream;
use serde::{Deserialize, Serialize};

use crate::crypto::{HashAlgorithm, SignatureAlgorithm};
use crate::encoding::{append_bytes, decimal, EncodingError};
use crate::types::{Address, Id};
use crate::value::{Argument, Value};

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block id.
    pub id: Id,
    /// Parent block id.
    pub parent_id: Id,
    /// Height.
    pub height: u64,
    /// Proposal timestamp.
    pub timestamp: DateTime<Utc>,
}

/// A collection reference carried in a block payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionGuarantee {
    /// Collection id.
    pub collection_id: Id,
}

/// Execution result seal carried in a block payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSeal {
    /// Sealed block.
    pub block_id: Id,
    /// Execution result being sealed.
    pub result_id: Id,
}

/// Full block: header plus payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Header.
    pub header: BlockHeader,
    /// Collections included in this block.
    pub collection_guarantees: Vec<CollectionGuarantee>,
    /// Seals included in this block.
    pub block_seals: Vec<BlockSeal>,
}

/// A batch of transaction ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection id.
    pub id: Id,
    /// Transactions, in execution order.
    pub transaction_ids: Vec<Id>,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A public key registered on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    /// Key index on the account.
    pub index: u32,
    /// 64-byte raw public key.
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
    /// Curve.
    pub sign_algo: SignatureAlgorithm,
    /// Hash used with this key.
    pub hash_algo: HashAlgorithm,
    /// Signing weight. Carried, never summed.
    pub weight: u32,
    /// Current sequence number.
    #[serde(with = "decimal")]
    pub sequence_number: BigUint,
    /// Revoked keys can no longer sign.
    pub revoked: bool,
}

impl AccountKey {
    /// A key that is not yet on chain, for account creation.
    pub fn new(
        public_key: Vec<u8>,
        sign_algo: SignatureAlgorithm,
        hash_algo: HashAlgorithm,
        weight: u32,
    ) -> Self {
        Self {
            index: 0,
            public_key,
            sign_algo,
            hash_algo,
            weight,
            sequence_number: BigUint::default(),
            revoked: false,
        }
    }

    /// Canonical `rlp([public_key, sign_algo, hash_algo, weight])`, the form
    /// account-creation scripts take.
    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(4);
        append_bytes(&mut s, &self.public_key);
        s.append(&self.sign_algo.code());
        s.append(&self.hash_algo.code());
        s.append(&self.weight);
        s.out().to_vec()
    }
}

/// Account state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Address.
    pub address: Address,
    /// Balance in raw UFix64 units.
    pub balance: u64,
    /// Registered keys.
    pub keys: Vec<AccountKey>,
    /// Deployed contracts by name.
    pub contracts: BTreeMap<String, String>,
}

impl Account {
    /// Key by index.
    pub fn key(&self, index: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == index)
    }
}

// ---------------------------------------------------------------------------
// Events and scripts
// ---------------------------------------------------------------------------

/// An event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Fully qualified type, e.g. `flow.AccountCreated`.
    pub event_type: String,
    /// Emitting transaction.
    pub transaction_id: Id,
    /// Transaction position in the block.
    pub transaction_index: u32,
    /// Event position in the transaction.
    pub event_index: u32,
    /// JSON-Cadence payload.
    pub payload: Argument,
}

impl Event {
    /// Decodes the payload.
    pub fn value(&self) -> Result<Value, EncodingError> {
        self.payload.decode()
    }

    /// Reads one field of an event's composite payload, e.g. `"address"` of
    /// `flow.AccountCreated`.
    pub fn field(&self, name: &str) -> Result<Option<Value>, EncodingError> {
        Ok(self.value()?.field(name).cloned())
    }
}

/// Events of one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResult {
    /// Block id.
    pub block_id: Id,
    /// Block height.
    pub block_height: u64,
    /// Block timestamp.
    pub block_timestamp: DateTime<Utc>,
    /// Matching events.
    pub events: Vec<Event>,
}

/// Raw result of a script execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptResponse(pub Argument);

impl ScriptResponse {
    /// Decodes the JSON-Cadence result.
    pub fn decode(&self) -> Result<Value, EncodingError> {
        self.0.decode()
    }
}
