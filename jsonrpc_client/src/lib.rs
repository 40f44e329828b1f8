//! A small JSON-RPC 2.0 client over HTTP
//!
//! Every outbound call in the system goes through this client: directory
//! server calls, gossip fan-out and chain fetches. Calls are one-shot; the
//! underlying connection pool is reused per client instance

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// The error member of a JSON-RPC response
#[derive(Deserialize, Debug)]
pub struct RpcError {
    /// Numeric error code
    pub code: i64,
    /// Human readable message; art-node errors carry their error name here
    pub message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// Error type for outbound calls
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a JSON-RPC error
    #[error("Server returned error {}: {}", .0.code, .0.message)]
    Rpc(RpcError),

    /// The server answered null where a result was required
    #[error("Server returned an empty result")]
    EmptyResult,
}

/// Type alias for call results
pub type Result<T> = std::result::Result<T, Error>;

/// A JSON-RPC client bound to one `host:port` peer address
pub struct JsonRpcClient {
    client: Client,
    address: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Builds a client for the given peer address
    pub fn new(address: &str) -> Result<Self> {
        Ok(JsonRpcClient {
            client: Client::builder().timeout(CALL_TIMEOUT).build()?,
            address: format!("http://{}", address),
            next_id: AtomicU64::new(1),
        })
    }

    /// Calls `method` with `params`, returning the decoded result
    ///
    /// `Ok(None)` means the server answered with a null result, which
    /// notification-style methods do
    pub async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<Option<T>> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: serde_json::to_value(params).expect("params serialization cannot fail"),
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.address)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Rpc(error));
        }
        Ok(response.result)
    }
}
