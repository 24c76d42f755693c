//! # Access Node Client
//!
//! [`AccessApi`] is the contract between the engine and a remote access node.
//! Every method is one remote call, stateless, and either returns the decoded
//! record or a [`ChainAccessError`] saying which kind of failure happened.
//!
//! ```text
//! models.rs : Block, Account, Event, ... (transport independent)
//! http.rs   : HttpAccessClient over the REST API (reqwest)
//! wire.rs   : REST request/response bodies (private)
//! ```
//!
//! ## Retries
//!
//! Nothing in here retries. Reads are safe for the caller to retry with
//! backoff when [`ChainAccessError::is_retryable`] says so. `send_transaction`
//! must never be retried blindly: the first attempt may already have been
//! accepted, and a resubmission needs a freshly signed transaction with a new
//! sequence number anyway.

pub mod http;
pub mod models;
mod wire;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpAccessClient;
pub use models::{
    Account, AccountKey, Block, BlockHeader, BlockSeal, Collection, CollectionGuarantee, Event,
    EventResult, ScriptResponse,
};

use crate::error::Result;
use crate::transaction::{Transaction, TransactionResult};
use crate::types::{Address, Id};
use crate::value::{Argument, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure talking to an access node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainAccessError {
    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The node answered with an error.
    #[error("access node rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status (or the transport's equivalent).
        status: u16,
        /// Reason reported by the node.
        message: String,
    },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ChainAccessError {
    /// `true` for failures where repeating the same read may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for ChainAccessError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AccessApi
// ---------------------------------------------------------------------------

/// Operations an access node offers.
#[async_trait]
pub trait AccessApi: Send + Sync {
    /// Checks the node is reachable.
    async fn ping(&self) -> Result<(), ChainAccessError>;

    /// Latest header. `sealed` picks the latest sealed block rather than
    /// the latest finalized one.
    async fn get_latest_block_header(&self, sealed: bool) -> Result<BlockHeader, ChainAccessError>;

    /// Header by id.
    async fn get_block_header_by_id(&self, id: Id) -> Result<BlockHeader, ChainAccessError>;

    /// Header by height.
    async fn get_block_header_by_height(&self, height: u64)
        -> Result<BlockHeader, ChainAccessError>;

    /// Latest full block.
    async fn get_latest_block(&self, sealed: bool) -> Result<Block, ChainAccessError>;

    /// Full block by id.
    async fn get_block_by_id(&self, id: Id) -> Result<Block, ChainAccessError>;

    /// Full block by height.
    async fn get_block_by_height(&self, height: u64) -> Result<Block, ChainAccessError>;

    /// Collection by id.
    async fn get_collection_by_id(&self, id: Id) -> Result<Collection, ChainAccessError>;

    /// Account at the latest sealed block.
    async fn get_account_at_latest_block(
        &self,
        address: Address,
    ) -> Result<Account, ChainAccessError>;

    /// Account as of `height`.
    async fn get_account_at_block_height(
        &self,
        address: Address,
        height: u64,
    ) -> Result<Account, ChainAccessError>;

    /// Submits a signed transaction and returns its id. At most once.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Id, ChainAccessError>;

    /// Transaction by id.
    async fn get_transaction_by_id(&self, id: Id) -> Result<Transaction, ChainAccessError>;

    /// Execution result by transaction id.
    async fn get_transaction_result_by_id(
        &self,
        id: Id,
    ) -> Result<TransactionResult, ChainAccessError>;

    /// Runs a read-only script against the latest sealed state.
    async fn execute_script_at_latest_block(
        &self,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError>;

    /// Runs a read-only script against the state at block `id`.
    async fn execute_script_at_block_id(
        &self,
        id: Id,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError>;

    /// Runs a read-only script against the state at `height`.
    async fn execute_script_at_block_height(
        &self,
        height: u64,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError>;

    /// Events of `event_type` in blocks `start..=end`.
    async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<EventResult>, ChainAccessError>;

    /// Events of `event_type` in the given blocks.
    async fn get_events_for_block_ids(
        &self,
        event_type: &str,
        ids: &[Id],
    ) -> Result<Vec<EventResult>, ChainAccessError>;
}

// ---------------------------------------------------------------------------
// AccessApiExt
// ---------------------------------------------------------------------------

fn to_arguments(values: &[Value]) -> Result<Vec<Argument>> {
    values
        .iter()
        .map(|v| v.to_argument().map_err(Into::into))
        .collect()
}

/// Script execution with typed [`Value`]s in and out. Available on every
/// [`AccessApi`].
#[async_trait]
pub trait AccessApiExt: AccessApi {
    /// [`AccessApi::execute_script_at_latest_block`] with typed values.
    async fn execute_script_with_values_at_latest_block(
        &self,
        script: &str,
        values: &[Value],
    ) -> Result<Value> {
        let arguments = to_arguments(values)?;
        let response = self.execute_script_at_latest_block(script, &arguments).await?;
        Ok(response.decode()?)
    }

    /// [`AccessApi::execute_script_at_block_id`] with typed values.
    async fn execute_script_with_values_at_block_id(
        &self,
        id: Id,
        script: &str,
        values: &[Value],
    ) -> Result<Value> {
        let arguments = to_arguments(values)?;
        let response = self.execute_script_at_block_id(id, script, &arguments).await?;
        Ok(response.decode()?)
    }

    /// [`AccessApi::execute_script_at_block_height`] with typed values.
    async fn execute_script_with_values_at_block_height(
        &self,
        height: u64,
        script: &str,
        values: &[Value],
    ) -> Result<Value> {
        let arguments = to_arguments(values)?;
        let response = self
            .execute_script_at_block_height(height, script, &arguments)
            .await?;
        Ok(response.decode()?)
    }
}

impl<T: AccessApi + ?Sized> AccessApiExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(ChainAccessError::Timeout.is_retryable());
        assert!(ChainAccessError::Transport("reset".into()).is_retryable());
        assert!(!ChainAccessError::NotFound("block".into()).is_retryable());
        assert!(!ChainAccessError::Decode("bad".into()).is_retryable());
        assert!(!ChainAccessError::Rejected {
            status: 400,
            message: "invalid signature".into()
        }
        .is_retryable());
    }

    #[test]
    fn rejected_carries_remote_reason() {
        let err = ChainAccessError::Rejected {
            status: 400,
            message: "sequence number mismatch".into(),
        };
        assert!(err.to_string().contains("sequence number mismatch"));
    }
}
