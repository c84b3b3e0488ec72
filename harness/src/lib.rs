//! Drives the EVM loader through JSON-RPC: queries the ledger, assembles and
//! signs envelopes of raw loader instructions, submits them and waits for
//! their confirmation.

pub use confirmation::{
    Confirmation, ConfirmationPolicy, Rejection, SubmissionResult, Submitter,
};
pub use envelope::{Envelope, EnvelopeBuilder};
pub use error::{HarnessError, Result};
pub use http::HttpTransport;
pub use ledger::Ledger;
pub use transport::RpcTransport;

pub mod confirmation;
pub mod envelope;
pub mod error;
mod extractor;
pub mod holder;
pub mod http;
pub mod ledger;
pub mod logs;
pub mod payload;
#[cfg(test)]
mod scripted;
pub mod transport;
