//! Crate-level error type.
//!
//! Each subsystem has its own error enum next to the code that raises it.
//! Operations that span subsystems (signing a transaction, the submission
//! pipeline, typed script execution) return [`Error`], which keeps the
//! original kind intact so callers can still decide between retry and give
//! up.

use thiserror::Error;

use crate::access::ChainAccessError;
use crate::crypto::SigningError;
use crate::encoding::EncodingError;

/// Any failure the engine can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input to the canonical encoder or value model.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A signature could not be produced.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The access node could not be reached or refused the call.
    #[error(transparent)]
    Access(#[from] ChainAccessError),
}

impl Error {
    /// `true` only for access failures that are safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Access(e) if e.is_retryable())
    }
}

/// `Result` defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
