//! JSON-RPC over HTTP/1.
//!
//! Every call opens its own connection to the node; the connection driver
//! lives only for the duration of that request.

use std::cell::Cell;

use common::types::Url;
use http_body_util::BodyExt;
use hyper::header::{HeaderValue, CONTENT_TYPE, HOST};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use json::Value;
use tokio::net::TcpStream;

use crate::error::{HarnessError, Result};
use crate::payload::{self, Call};
use crate::transport::RpcTransport;

/// # HTTP Transport
///
/// Stateless JSON-RPC client bound to one node url.
pub struct HttpTransport {
    url: Url,
    id: Cell<u64>,
}

impl HttpTransport {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            id: Cell::new(0),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn next_id(&self) -> u64 {
        let id = self.id.get() + 1;
        self.id.set(id);
        id
    }

    /// # Post
    ///
    /// Sends `body` and collects the complete response body.
    async fn post(&self, body: String) -> Result<Vec<u8>> {
        let stream = TcpStream::connect(self.url.address()).await?;
        stream.set_nodelay(true)?;
        let io = TokioIo::new(stream);

        let (mut sender, con) = hyper::client::conn::http1::handshake(io).await?;
        tokio::spawn(async move {
            if let Err(err) = con.await {
                tracing::debug!(%err, "rpc connection closed with error");
            }
        });

        let mut request = Request::new(body);
        *request.uri_mut() = self.url.0.clone();
        *request.method_mut() = Method::POST;
        let host = HeaderValue::from_str(&self.url.address())
            .map_err(|err| HarnessError::Transport(err.to_string()))?;
        let headers = request.headers_mut();
        headers.insert(HOST, host);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = sender.send_request(request).await?;
        let status = response.status();
        let data = response.into_body().collect().await?.to_bytes().to_vec();
        if !status.is_success() && data.is_empty() {
            return Err(HarnessError::Transport(format!("http status {status}")));
        }
        Ok(data)
    }
}

impl RpcTransport for HttpTransport {
    async fn call(&self, call: Call) -> Result<Value> {
        let id = self.next_id();
        tracing::debug!(method = call.method, id, "rpc call");
        let data = self.post(call.body(id)).await?;
        payload::parse_response(&data)
    }
}
