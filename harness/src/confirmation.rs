//! Submission and confirmation of envelopes.
//!
//! A submission either fails synchronously at the node (preflight), in which
//! case it is reported as a [`Rejection`] at once, or is polled until the
//! ledger records it or the configured ceiling elapses.

use std::time::Duration;

use common::config::ConfirmationSettings;
use json::Value;
use keypair::Keypair;
use signature::Signature;
use tokio::time::{sleep, timeout, Instant};

use crate::envelope::Envelope;
use crate::error::{HarnessError, Result};
use crate::ledger::Ledger;
use crate::transport::RpcTransport;

const INSTRUCTION_ERROR_PREFIX: &str = "Error processing Instruction ";
const SIMULATION_ERROR_PREFIX: &str = "Transaction simulation failed: ";

/// # Confirmation
///
/// The ledger's record of a finalized transaction. `error` holds the recorded
/// execution error; a transaction that failed on chain is still confirmed.
#[derive(Clone, Debug, PartialEq)]
pub struct Confirmation {
    pub signature: Signature,
    pub slot: u64,
    pub logs: Vec<String>,
    pub error: Option<Value>,
}

impl Confirmation {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// # Rejection
///
/// Synchronous refusal by the node, usually a failed preflight simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// Failure reason without the node's framing text
    pub reason: String,
    /// Full error message as returned by the node
    pub message: String,
    /// Simulation logs, empty when the node sent none
    pub logs: Vec<String>,
}

impl Rejection {
    pub fn from_rpc(message: &str, data: Option<&Value>) -> Self {
        let logs = data
            .and_then(|data| data.get("logs"))
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            reason: rejection_reason(message).to_owned(),
            message: message.to_owned(),
            logs,
        }
    }
}

/// Text after `Error processing Instruction N: `, else after
/// `Transaction simulation failed: `, else the whole message.
fn rejection_reason(message: &str) -> &str {
    if let Some(pos) = message.find(INSTRUCTION_ERROR_PREFIX) {
        let rest = &message[pos + INSTRUCTION_ERROR_PREFIX.len()..];
        if let Some(colon) = rest.find(": ") {
            return &rest[colon + 2..];
        }
    }
    if let Some(pos) = message.find(SIMULATION_ERROR_PREFIX) {
        return &message[pos + SIMULATION_ERROR_PREFIX.len()..];
    }
    message
}

/// Terminal outcome of one submission.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionResult {
    Confirmed(Confirmation),
    Rejected(Rejection),
    TimedOut {
        signature: Signature,
        waited: Duration,
    },
}

impl SubmissionResult {
    /// Turns rejections and timeouts into errors.
    pub fn into_confirmation(self) -> Result<Confirmation> {
        match self {
            SubmissionResult::Confirmed(confirmation) => Ok(confirmation),
            SubmissionResult::Rejected(rejection) => Err(HarnessError::Rejected(Box::new(rejection))),
            SubmissionResult::TimedOut { signature, waited } => {
                Err(HarnessError::ConfirmationTimeout { signature, waited })
            }
        }
    }
}

/// # Confirmation Policy
///
/// Poll schedule: wait `first_wait`, then poll every `interval` until
/// `timeout` has elapsed since the transaction was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub first_wait: Duration,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        (&ConfirmationSettings::default()).into()
    }
}

impl From<&ConfirmationSettings> for ConfirmationPolicy {
    fn from(settings: &ConfirmationSettings) -> Self {
        Self {
            first_wait: settings.first_wait,
            interval: settings.interval,
            timeout: settings.timeout,
        }
    }
}

/// # Submitter
///
/// Signs, sends and confirms envelopes through a [`Ledger`].
pub struct Submitter<'a, T> {
    ledger: &'a Ledger<T>,
    policy: ConfirmationPolicy,
}

impl<'a, T: RpcTransport> Submitter<'a, T> {
    pub fn new(ledger: &'a Ledger<T>, policy: ConfirmationPolicy) -> Self {
        Self { ledger, policy }
    }

    pub fn ledger(&self) -> &'a Ledger<T> {
        self.ledger
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// # Submit
    ///
    /// Sends the envelope and waits for its confirmation. Rejections are
    /// returned without polling.
    pub async fn submit(&self, envelope: &Envelope, signers: &[&Keypair]) -> Result<SubmissionResult> {
        match self.send(envelope, signers).await? {
            Ok(signature) => self.confirm(signature).await,
            Err(rejection) => Ok(SubmissionResult::Rejected(rejection)),
        }
    }

    /// Like [`Submitter::submit`], with rejections and timeouts as errors.
    pub async fn submit_confirmed(&self, envelope: &Envelope, signers: &[&Keypair]) -> Result<Confirmation> {
        self.submit(envelope, signers).await?.into_confirmation()
    }

    /// # Send
    ///
    /// Signs against the latest blockhash and sends with preflight, without
    /// waiting for confirmation. The inner error is the node's rejection.
    pub async fn send(
        &self,
        envelope: &Envelope,
        signers: &[&Keypair],
    ) -> Result<std::result::Result<Signature, Rejection>> {
        let blockhash = self.ledger.get_latest_blockhash().await?;
        let transaction = envelope.sign(signers, blockhash)?;
        match self.ledger.send_transaction(&transaction).await {
            Ok(signature) => {
                tracing::info!(
                    %signature,
                    instructions = envelope.instructions().len(),
                    "transaction sent"
                );
                Ok(Ok(signature))
            }
            Err(HarnessError::Rpc { message, data, .. }) => {
                let rejection = Rejection::from_rpc(&message, data.as_ref());
                tracing::warn!(reason = %rejection.reason, "transaction rejected");
                Ok(Err(rejection))
            }
            Err(err) => Err(err),
        }
    }

    /// # Confirm
    ///
    /// Polls until the ledger records `signature` or the policy ceiling
    /// elapses. Transport failures while polling are returned as errors.
    pub async fn confirm(&self, signature: Signature) -> Result<SubmissionResult> {
        self.confirm_after(signature, self.policy.first_wait).await
    }

    /// Confirms several fire-and-forget submissions, in order. The first wait
    /// applies once; later signatures are polled right away.
    pub async fn confirm_all(&self, signatures: &[Signature]) -> Result<Vec<SubmissionResult>> {
        let mut results = Vec::with_capacity(signatures.len());
        let mut first_wait = self.policy.first_wait;
        for signature in signatures {
            results.push(self.confirm_after(*signature, first_wait).await?);
            first_wait = Duration::ZERO;
        }
        Ok(results)
    }

    async fn confirm_after(&self, signature: Signature, first_wait: Duration) -> Result<SubmissionResult> {
        let started = Instant::now();
        match timeout(self.policy.timeout, self.poll(&signature, first_wait)).await {
            Ok(confirmation) => {
                let confirmation = confirmation?;
                tracing::info!(
                    %signature,
                    slot = confirmation.slot,
                    success = confirmation.is_success(),
                    elapsed = ?started.elapsed(),
                    "transaction confirmed"
                );
                Ok(SubmissionResult::Confirmed(confirmation))
            }
            Err(_) => {
                let waited = started.elapsed();
                tracing::warn!(%signature, ?waited, "transaction was not confirmed in time");
                Ok(SubmissionResult::TimedOut { signature, waited })
            }
        }
    }

    async fn poll(&self, signature: &Signature, first_wait: Duration) -> Result<Confirmation> {
        sleep(first_wait).await;
        let mut attempt = 1u32;
        loop {
            tracing::debug!(%signature, attempt, "polling transaction status");
            if let Some(confirmation) = self.ledger.get_transaction(signature).await? {
                return Ok(confirmation);
            }
            attempt += 1;
            sleep(self.policy.interval).await;
        }
    }
}
