//! Value types that make up a transaction and its outcome.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::access::models::Event;
use crate::encoding::decimal;
use crate::types::{Address, Id};

// ---------------------------------------------------------------------------
// ProposalKey
// ---------------------------------------------------------------------------

/// The account key whose sequence number this transaction consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProposalKey {
    /// Proposer account.
    pub address: Address,
    /// Key index on the proposer account.
    pub key_index: u32,
    /// Expected current sequence number of that key.
    #[serde(with = "decimal")]
    pub sequence_number: BigUint,
}

impl ProposalKey {
    /// Convenience constructor.
    pub fn new(address: Address, key_index: u32, sequence_number: impl Into<BigUint>) -> Self {
        Self {
            address,
            key_index,
            sequence_number: sequence_number.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionSignature
// ---------------------------------------------------------------------------

/// One signature record in a payload or envelope signature set.
///
/// `signer_index` is informational. The encoder recomputes it from
/// `address` against the transaction's signer list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// Account that signed.
    pub address: Address,
    /// Position of `address` in the signer list, as last computed.
    pub signer_index: u32,
    /// Key index on the signing account.
    pub key_index: u32,
    /// Raw signature bytes.
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

impl TransactionSignature {
    /// Convenience constructor.
    pub fn new(address: Address, signer_index: u32, key_index: u32, signature: Vec<u8>) -> Self {
        Self {
            address,
            signer_index,
            key_index,
            signature,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Lifecycle state reported by the access node.
///
/// A transaction goes `Pending` → `Finalized` (included in a block) →
/// `Executed` → `Sealed`. `Expired` means its reference block fell out of the
/// expiry window before it was included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Node has no record yet.
    Unknown,
    /// Accepted by the node, waiting for a collection.
    Pending,
    /// Included in a finalized block.
    Finalized,
    /// Executed, result not yet sealed.
    Executed,
    /// Result sealed. Terminal.
    Sealed,
    /// Reference block too old. Terminal.
    Expired,
}

impl TransactionStatus {
    /// `true` once the status can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sealed | Self::Expired)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Pending => write!(f, "Pending"),
            Self::Finalized => write!(f, "Finalized"),
            Self::Executed => write!(f, "Executed"),
            Self::Sealed => write!(f, "Sealed"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" | "" => Ok(Self::Unknown),
            "Pending" => Ok(Self::Pending),
            "Finalized" => Ok(Self::Finalized),
            "Executed" => Ok(Self::Executed),
            "Sealed" => Ok(Self::Sealed),
            "Expired" => Ok(Self::Expired),
            other => Err(format!("unknown transaction status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionResult
// ---------------------------------------------------------------------------

/// Execution outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Current lifecycle state.
    pub status: TransactionStatus,
    /// Zero on success.
    pub status_code: u32,
    /// Cadence error message, empty on success.
    pub error_message: String,
    /// Computation units consumed.
    pub computation_used: u64,
    /// Block the transaction was included in. Zero while pending.
    pub block_id: Id,
    /// Events emitted during execution.
    pub events: Vec<Event>,
}

impl TransactionResult {
    /// `true` when execution reverted.
    pub fn is_failed(&self) -> bool {
        self.status_code != 0 || !self.error_message.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_and_displays() {
        for status in [
            TransactionStatus::Unknown,
            TransactionStatus::Pending,
            TransactionStatus::Finalized,
            TransactionStatus::Executed,
            TransactionStatus::Sealed,
            TransactionStatus::Expired,
        ] {
            assert_eq!(status.to_string().parse::<TransactionStatus>().unwrap(), status);
        }
        assert!("Lost".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn only_sealed_and_expired_are_terminal() {
        assert!(TransactionStatus::Sealed.is_terminal());
        assert!(TransactionStatus::Expired.is_terminal());
        assert!(!TransactionStatus::Executed.is_terminal());
    }

    #[test]
    fn signature_serde_uses_hex() {
        let sig = TransactionSignature::new(Address::from_hex("01").unwrap(), 0, 2, vec![0xab, 0xcd]);
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json["signature"], "abcd");
        assert_eq!(json["address"], "0x0000000000000001");
    }

    #[test]
    fn sequence_number_serde_is_decimal_string() {
        let key = ProposalKey::new(Address::from_hex("01").unwrap(), 1, 10u64);
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["sequence_number"], "10");
        let back: ProposalKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }
}
