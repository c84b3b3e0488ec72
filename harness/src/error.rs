//! Error types of the harness library.

use std::time::Duration;

use interface::EncodingError;
use pubkey::Pubkey;
use signature::Signature;
use signer::SignerError;
use thiserror::Error;

use crate::confirmation::Rejection;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Error, Debug)]
pub enum HarnessError {
    /// Instruction or address encoding failed, a caller bug
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("transaction has no instructions")]
    EmptyTransaction,

    /// Missing or extra signer for the envelope
    #[error("failed to sign transaction: {0}")]
    Signing(#[from] SignerError),

    /// Connection, HTTP or framing failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Structured JSON-RPC error returned by the node
    #[error("rpc error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<json::Value>,
    },

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("account {address} holds {actual} bytes, expected at least {expected}")]
    AccountTooSmall {
        address: Pubkey,
        actual: usize,
        expected: usize,
    },

    /// Response did not have the expected shape
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("transaction rejected: {}", .0.reason)]
    Rejected(Box<Rejection>),

    #[error("transaction {signature} was not confirmed within {waited:?}")]
    ConfirmationTimeout {
        signature: Signature,
        waited: Duration,
    },
}

impl HarnessError {
    pub(crate) fn decode(what: &'static str, reason: impl ToString) -> Self {
        HarnessError::Decode {
            what,
            reason: reason.to_string(),
        }
    }
}

impl From<hyper::Error> for HarnessError {
    fn from(err: hyper::Error) -> Self {
        HarnessError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Transport(err.to_string())
    }
}

impl From<json::Error> for HarnessError {
    fn from(err: json::Error) -> Self {
        HarnessError::decode("response", err)
    }
}
