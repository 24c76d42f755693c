//! # Transaction Module
//!
//! Construction, canonical encoding and signing of transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs   : ProposalKey, TransactionSignature, status and result types
//! builder.rs : the immutable Transaction, its RLP encoding, TransactionBuilder
//! signing.rs : the two-phase signing coordinator
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] assembles the fields.
//! 2. **Payload phase**: proposer and authorizers sign
//!    [`Transaction::signable_payload`] via [`sign_payload`].
//! 3. **Envelope phase**: the payer signs
//!    [`Transaction::signable_envelope`] via [`sign_envelope`].
//! 4. **Submit**: hand the result to an
//!    [`AccessApi`](crate::access::AccessApi), or let the
//!    [`Submitter`](crate::submit::Submitter) drive all of the above.
//!
//! Between any two steps the value can be serialized to JSON and moved to
//! another machine.

pub mod builder;
pub mod signing;
pub mod types;

pub use builder::{Transaction, TransactionBuilder};
pub use signing::{sign, sign_envelope, sign_payload};
pub use types::{ProposalKey, TransactionResult, TransactionSignature, TransactionStatus};
