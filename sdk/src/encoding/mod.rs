//! # Canonical Encoding
//!
//! Everything that ends up under a signature goes through this module. The
//! chain verifies signatures over a byte string it rebuilds from its own copy
//! of the transaction, so the client and the chain must agree on every single
//! byte. That rules out serde formats (field order, whitespace, integer
//! widths all vary) and leaves us with RLP: one valid byte string per value.
//!
//! ## Rules
//!
//! - Unsigned integers are minimal big-endian byte strings. Zero is the empty
//!   byte string (`0x80`), never `0x00`.
//! - Fixed-width identifiers (addresses, ids) always encode at full width,
//!   leading zero bytes included.
//! - Lists are length-prefixed, recursively. An empty list is `0xc0`; a field
//!   is never omitted.
//! - Every signable byte stream starts with a 32-byte domain tag so a
//!   transaction signature can never be replayed as, say, a user message
//!   signature.

pub mod decimal;

use num_bigint::BigUint;
use rlp::RlpStream;
use thiserror::Error;

use crate::config::DOMAIN_TAG_LENGTH;

// ---------------------------------------------------------------------------
// Domain tags
// ---------------------------------------------------------------------------

/// Prefix for transaction payloads and envelopes.
pub const TRANSACTION_DOMAIN_TAG: [u8; DOMAIN_TAG_LENGTH] = pad_tag(b"FLOW-V0.0-transaction");

/// Prefix for arbitrary user messages signed with an account key.
pub const USER_DOMAIN_TAG: [u8; DOMAIN_TAG_LENGTH] = pad_tag(b"FLOW-V0.0-user");

/// Right-pads an ASCII tag with NUL bytes to the fixed tag width.
const fn pad_tag(tag: &[u8]) -> [u8; DOMAIN_TAG_LENGTH] {
    assert!(tag.len() <= DOMAIN_TAG_LENGTH);
    let mut out = [0u8; DOMAIN_TAG_LENGTH];
    let mut i = 0;
    while i < tag.len() {
        out[i] = tag[i];
        i += 1;
    }
    out
}

/// Prepends `tag` to an already-encoded body.
pub fn with_domain_tag(tag: &[u8; DOMAIN_TAG_LENGTH], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(DOMAIN_TAG_LENGTH + body.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(body);
    out
}

/// Bytes an account key signs to prove ownership over an arbitrary message.
/// The user tag keeps such a signature from ever validating as a
/// transaction signature.
pub fn signable_user_message(message: &[u8]) -> Vec<u8> {
    with_domain_tag(&USER_DOMAIN_TAG, message)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed input to the canonical encoder.
///
/// In normal operation none of these should ever fire: they mean a caller
/// handed us an identifier of the wrong width or an argument that is not
/// valid JSON-Cadence. Treat them as precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// A fixed-width field was given more bytes than it can hold.
    #[error("{kind} must be at most {max} bytes, got {actual}")]
    InvalidLength {
        /// Which field (e.g. "address").
        kind: &'static str,
        /// Declared width in bytes.
        max: usize,
        /// Bytes actually supplied.
        actual: usize,
    },

    /// A hex string could not be decoded.
    #[error("invalid hex for {kind}: {reason}")]
    InvalidHex {
        /// Which field (e.g. "id").
        kind: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// An argument or script result is not valid JSON-Cadence.
    #[error("malformed argument: {0}")]
    Argument(String),

    /// Unrecognized signature algorithm name or code.
    #[error("unknown signature algorithm: {0}")]
    UnknownSignatureAlgorithm(String),

    /// Unrecognized hash algorithm name or code.
    #[error("unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),
}

// ---------------------------------------------------------------------------
// Integer helpers
// ---------------------------------------------------------------------------

/// Minimal big-endian bytes of an unbounded unsigned integer.
///
/// `BigUint::to_bytes_be` returns `[0]` for zero, which would encode as
/// `0x00` instead of the canonical empty string.
pub fn unsigned_bytes(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Appends an unbounded unsigned integer to an RLP stream.
pub fn append_unsigned(stream: &mut RlpStream, value: &BigUint) {
    stream.append(&unsigned_bytes(value));
}

/// Appends a byte string item.
pub fn append_bytes(stream: &mut RlpStream, bytes: &[u8]) {
    stream.append(&bytes.to_vec());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
