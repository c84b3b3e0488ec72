//! JSON-RPC request builders, one per ledger method the harness calls.

use base64::{prelude::BASE64_STANDARD, Engine};
use common::types::Commitment;
use json::{json, Value};
use pubkey::Pubkey;
use signature::Signature;
use transaction::Transaction;

use crate::error::{HarnessError, Result};

/// A JSON-RPC method together with its positional params.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub params: Value,
}

impl Call {
    fn new(method: &'static str, params: Value) -> Self {
        Self { method, params }
    }

    /// Request body with the given request `id`.
    pub fn body(&self, id: u64) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": self.method,
            "params": self.params,
        })
        .to_string()
    }
}

pub fn balance(address: &Pubkey, commitment: Commitment) -> Call {
    Call::new(
        "getBalance",
        json!([address.to_string(), { "commitment": commitment.as_str() }]),
    )
}

pub fn account_info(address: &Pubkey, commitment: Commitment) -> Call {
    Call::new(
        "getAccountInfo",
        json!([
            address.to_string(),
            { "encoding": "base64", "commitment": commitment.as_str() }
        ]),
    )
}

pub fn program_accounts(owner: &Pubkey, commitment: Commitment) -> Call {
    Call::new(
        "getProgramAccounts",
        json!([
            owner.to_string(),
            { "encoding": "base64", "commitment": commitment.as_str() }
        ]),
    )
}

pub fn slot(commitment: Commitment) -> Call {
    Call::new("getSlot", json!([{ "commitment": commitment.as_str() }]))
}

pub fn block(slot: u64, commitment: Commitment) -> Call {
    Call::new(
        "getBlock",
        json!([
            slot,
            {
                "encoding": "json",
                "transactionDetails": "none",
                "rewards": false,
                "commitment": commitment.for_transaction_lookup().as_str(),
            }
        ]),
    )
}

pub fn blockhash(commitment: Commitment) -> Call {
    Call::new(
        "getLatestBlockhash",
        json!([{ "commitment": commitment.as_str() }]),
    )
}

pub fn rent_exemption(len: usize) -> Call {
    Call::new("getMinimumBalanceForRentExemption", json!([len]))
}

pub fn airdrop(address: &Pubkey, lamports: u64) -> Call {
    Call::new("requestAirdrop", json!([address.to_string(), lamports]))
}

pub fn transaction_status(signature: &Signature, commitment: Commitment) -> Call {
    Call::new(
        "getTransaction",
        json!([
            signature.to_string(),
            {
                "encoding": "json",
                "commitment": commitment.for_transaction_lookup().as_str(),
                "maxSupportedTransactionVersion": 0,
            }
        ]),
    )
}

/// `sendTransaction` with preflight simulation at `commitment`.
pub fn transaction(transaction: &Transaction, commitment: Commitment) -> Result<Call> {
    let serialized = bincode::serialize(transaction)
        .map_err(|err| HarnessError::decode("transaction", err))?;
    let encoded = BASE64_STANDARD.encode(serialized);
    Ok(Call::new(
        "sendTransaction",
        json!([
            encoded,
            {
                "encoding": "base64",
                "skipPreflight": false,
                "preflightCommitment": commitment.as_str(),
            }
        ]),
    ))
}

/// # Parse Response
///
/// Returns the `result` member of a JSON-RPC response, or the structured
/// `error` member as [`HarnessError::Rpc`].
pub fn parse_response(data: &[u8]) -> Result<Value> {
    let mut response: Value = json::from_slice(data).inspect_err(|_| {
        tracing::error!(
            "failed to parse response: {}",
            String::from_utf8_lossy(data)
        )
    })?;
    if let Some(error) = response.get_mut("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let data = error.get_mut("data").map(Value::take);
        return Err(HarnessError::Rpc {
            code,
            message,
            data,
        });
    }
    response
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| HarnessError::decode("response", "neither result nor error present"))
}
