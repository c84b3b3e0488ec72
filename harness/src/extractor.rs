use base64::{prelude::BASE64_STANDARD, Engine};
use hash::Hash;
use json::Value;
use pubkey::Pubkey;
use signature::Signature;

use crate::confirmation::Confirmation;
use crate::error::{HarnessError, Result};

fn missing(what: &'static str) -> HarnessError {
    HarnessError::decode(what, "field missing from response")
}

fn u64_at(value: &Value, what: &'static str) -> Result<u64> {
    value.as_u64().ok_or_else(|| missing(what))
}

fn str_at<'a>(value: &'a Value, what: &'static str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| missing(what))
}

/// Decodes `["<base64>", "base64"]` account data.
fn account_data(value: &Value) -> Result<Vec<u8>> {
    let data = str_at(&value["data"][0], "account data")?;
    BASE64_STANDARD
        .decode(data)
        .map_err(|err| HarnessError::decode("account data", err))
}

pub fn balance_extractor(value: Value) -> Result<u64> {
    u64_at(&value["value"], "balance")
}

pub fn u64_extractor(value: Value) -> Result<u64> {
    u64_at(&value, "integer result")
}

/// Account bytes, `None` when the account does not exist.
pub fn account_extractor(value: Value) -> Result<Option<Vec<u8>>> {
    match &value["value"] {
        Value::Null => Ok(None),
        account => account_data(account).map(Some),
    }
}

pub fn program_accounts_extractor(value: Value) -> Result<Vec<(Pubkey, Vec<u8>)>> {
    let entries = value
        .as_array()
        .ok_or_else(|| missing("program accounts"))?;
    entries
        .iter()
        .map(|entry| {
            let address = str_at(&entry["pubkey"], "program account address")?
                .parse::<Pubkey>()
                .map_err(|err| HarnessError::decode("program account address", err))?;
            Ok((address, account_data(&entry["account"])?))
        })
        .collect()
}

pub fn blockhash_extractor(value: Value) -> Result<Hash> {
    parse_hash(&value["value"]["blockhash"])
}

pub fn block_hash_extractor(value: Value) -> Result<Hash> {
    parse_hash(&value["blockhash"])
}

fn parse_hash(value: &Value) -> Result<Hash> {
    str_at(value, "blockhash")?
        .parse::<Hash>()
        .map_err(|err| HarnessError::decode("blockhash", err))
}

pub fn signature_extractor(value: Value) -> Result<Signature> {
    str_at(&value, "signature")?
        .parse::<Signature>()
        .map_err(|err| HarnessError::decode("signature", err))
}

/// # Transaction Extractor
///
/// Builds a [`Confirmation`] out of a `getTransaction` result, `None` while the
/// ledger does not know the transaction yet.
pub fn transaction_extractor(signature: Signature, value: Value) -> Result<Option<Confirmation>> {
    if value.is_null() {
        return Ok(None);
    }
    let slot = u64_at(&value["slot"], "transaction slot")?;
    let meta = &value["meta"];
    let logs = meta["logMessages"]
        .as_array()
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let error = Some(&meta["err"]).filter(|err| !err.is_null()).cloned();
    Ok(Some(Confirmation {
        signature,
        slot,
        logs,
        error,
    }))
}
