//! In-memory transport answering from a closure, for engine tests.

use std::cell::RefCell;

use hash::Hash;
use json::{json, Value};

use crate::error::Result;
use crate::payload::Call;
use crate::transport::RpcTransport;

type Handler = Box<dyn FnMut(&Call) -> Result<Value>>;

pub(crate) struct Scripted {
    handler: RefCell<Handler>,
    calls: RefCell<Vec<Call>>,
}

impl Scripted {
    pub(crate) fn new(handler: impl FnMut(&Call) -> Result<Value> + 'static) -> Self {
        Self {
            handler: RefCell::new(Box::new(handler)),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn count(&self, method: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    pub(crate) fn calls(&self, method: &str) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }
}

impl RpcTransport for Scripted {
    async fn call(&self, call: Call) -> Result<Value> {
        let result = (self.handler.borrow_mut())(&call);
        self.calls.borrow_mut().push(call);
        result
    }
}

pub(crate) fn blockhash_result() -> Value {
    json!({
        "context": { "slot": 1 },
        "value": {
            "blockhash": Hash::new_from_array([1; 32]).to_string(),
            "lastValidBlockHeight": 100,
        }
    })
}
