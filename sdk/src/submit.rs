//! # Submission Pipeline
//!
//! Fetch, build, sign, send:
//!
//! ```text
//!   latest sealed block ─┐
//!                        ├─▶ build ─▶ payload phase ─▶ envelope phase ─▶ send
//!   proposer account ────┘
//! ```
//!
//! The two lookups have no dependency on each other and run concurrently.
//! Everything after them is strictly sequential. Every attempt does fresh
//! lookups; a sequence number is never reused from an earlier attempt.
//!
//! ## Cancellation
//!
//! Dropping the future before the send starts is side-effect free. The send
//! itself runs as its own tokio task, so once it has been issued its outcome
//! is still logged even if the caller stops waiting.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::{info, warn};

use crate::access::{AccessApi, ChainAccessError};
use crate::config::DEFAULT_GAS_LIMIT;
use crate::crypto::{Signer, SigningError};
use crate::error::Result;
use crate::transaction::{signing, ProposalKey, Transaction, TransactionBuilder};
use crate::types::{Address, Id};
use crate::value::Argument;

/// What to submit, minus everything that has to be looked up on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Cadence source.
    pub script: String,
    /// Encoded arguments.
    pub arguments: Vec<Argument>,
    /// Proposer account.
    pub proposer: Address,
    /// Proposer key whose sequence number is consumed.
    pub proposer_key_index: u32,
    /// Paying account.
    pub payer: Address,
    /// Authorizing accounts.
    pub authorizers: Vec<Address>,
    /// Gas limit.
    pub gas_limit: BigUint,
}

impl TransactionRequest {
    /// A request where `proposer` also pays. No authorizers, default gas.
    pub fn new(script: impl Into<String>, proposer: Address, proposer_key_index: u32) -> Self {
        Self {
            script: script.into(),
            arguments: Vec::new(),
            proposer,
            proposer_key_index,
            payer: proposer,
            authorizers: Vec::new(),
            gas_limit: BigUint::from(DEFAULT_GAS_LIMIT),
        }
    }

    /// Sets the arguments.
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the payer.
    pub fn with_payer(mut self, payer: Address) -> Self {
        self.payer = payer;
        self
    }

    /// Sets the authorizers.
    pub fn with_authorizers(mut self, authorizers: Vec<Address>) -> Self {
        self.authorizers = authorizers;
        self
    }

    /// Sets the gas limit.
    pub fn with_gas_limit(mut self, gas_limit: impl Into<BigUint>) -> Self {
        self.gas_limit = gas_limit.into();
        self
    }
}

/// Drives transactions from request to submission against one access node.
#[derive(Clone)]
pub struct Submitter {
    client: Arc<dyn AccessApi>,
}

impl Submitter {
    /// Wraps an access client.
    pub fn new(client: Arc<dyn AccessApi>) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub fn client(&self) -> &Arc<dyn AccessApi> {
        &self.client
    }

    /// Looks up the reference block and the proposer's current sequence
    /// number, then builds the unsigned transaction.
    pub async fn prepare(&self, request: &TransactionRequest) -> Result<Transaction> {
        let (block, proposer) = futures::try_join!(
            self.client.get_latest_block_header(true),
            self.client.get_account_at_latest_block(request.proposer),
        )?;

        let key = proposer.key(request.proposer_key_index).ok_or_else(|| {
            ChainAccessError::NotFound(format!(
                "key {} on account {}",
                request.proposer_key_index, request.proposer
            ))
        })?;
        if key.revoked {
            return Err(SigningError::InvalidKey(format!(
                "key {} on account {} is revoked",
                key.index, request.proposer
            ))
            .into());
        }

        Ok(TransactionBuilder::new()
            .script(request.script.clone())
            .arguments(request.arguments.clone())
            .reference_block_id(block.id)
            .gas_limit(request.gas_limit.clone())
            .proposal_key(ProposalKey {
                address: request.proposer,
                key_index: key.index,
                sequence_number: key.sequence_number.clone(),
            })
            .payer(request.payer)
            .authorizers(request.authorizers.clone())
            .build())
    }

    /// Runs both signing phases on `tx` and sends it.
    pub async fn submit(&self, tx: &Transaction, signers: &[Arc<dyn Signer>]) -> Result<Id> {
        let signed = signing::sign(tx, signers).await?;
        self.send(signed).await
    }

    /// [`Submitter::prepare`] followed by [`Submitter::submit`].
    pub async fn submit_request(
        &self,
        request: &TransactionRequest,
        signers: &[Arc<dyn Signer>],
    ) -> Result<Id> {
        let tx = self.prepare(request).await?;
        self.submit(&tx, signers).await
    }

    /// Sends an already signed transaction. Never retried.
    pub async fn send(&self, tx: Transaction) -> Result<Id> {
        let client = Arc::clone(&self.client);
        let local_id = tx.id();
        let task = tokio::spawn(async move {
            let outcome = client.send_transaction(&tx).await;
            match &outcome {
                Ok(id) => info!(%id, "transaction accepted by access node"),
                Err(e) => warn!(id = %local_id, error = %e, "transaction submission failed"),
            }
            outcome
        });
        let outcome = task
            .await
            .map_err(|e| ChainAccessError::Transport(format!("submission task failed: {e}")))?;
        Ok(outcome?)
    }
}
