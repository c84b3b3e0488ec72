use std::future::Future;

use json::Value;

use crate::error::Result;
use crate::payload::Call;

/// # RPC Transport
///
/// Sends one JSON-RPC call and resolves to its `result` member. Structured
/// errors from the node come back as [`crate::HarnessError::Rpc`].
pub trait RpcTransport {
    fn call(&self, call: Call) -> impl Future<Output = Result<Value>>;
}

