// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # flow-sdk: Client Engine for the Flow Blockchain
//!
//! Builds transactions, encodes them into the exact bytes the chain expects
//! to see signed, collects signatures from however many key holders a
//! transaction needs, and talks to an access node to fetch chain state and
//! submit the result.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! - **types**: `Address` (8 bytes) and `Id` (32 bytes). Fixed width, checked
//!   on construction.
//! - **value**: JSON-Cadence values and the encoded `Argument` form.
//! - **encoding**: RLP helpers and domain tags. One byte string per value.
//! - **transaction**: the immutable `Transaction`, its canonical payload and
//!   envelope, and the two-phase signing coordinator.
//! - **crypto**: hashes, P-256/secp256k1 keys and the `Signer` trait.
//! - **access**: the `AccessApi` contract and its REST implementation.
//! - **submit**: fetch, build, sign and send in one call.
//! - **templates**: ready-made transactions (account creation).
//! - **config**: protocol constants, networks, client configuration.
//!
//! ## Quick tour
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use flow_sdk::access::HttpAccessClient;
//! use flow_sdk::config::Network;
//! use flow_sdk::crypto::{HashAlgorithm, InMemorySigner, PrivateKey, SignatureAlgorithm, Signer};
//! use flow_sdk::submit::{Submitter, TransactionRequest};
//! use flow_sdk::types::Address;
//!
//! # async fn run() -> flow_sdk::Result<()> {
//! let client = HttpAccessClient::for_network(Network::Emulator)?;
//! let account = Address::from_hex("f8d6e0586b0a20c7")?;
//! let key = PrivateKey::from_hex(SignatureAlgorithm::EcdsaP256, "94e7...")?;
//! let signer: Arc<dyn Signer> =
//!     Arc::new(InMemorySigner::new(account, 0, key, HashAlgorithm::Sha3_256));
//!
//! let request = TransactionRequest::new("transaction { execute { log(1) } }", account, 0)
//!     .with_authorizers(vec![account]);
//! let id = Submitter::new(Arc::new(client))
//!     .submit_request(&request, &[signer])
//!     .await?;
//! println!("submitted {id}");
//! # Ok(())
//! # }
//! ```
//!
//! The library only emits `tracing` events; installing a subscriber is up
//! to the binary.

pub mod access;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod submit;
pub mod templates;
pub mod transaction;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use transaction::{Transaction, TransactionBuilder};
pub use types::{Address, Id};
pub use value::{Argument, CompositeKind, Value};
