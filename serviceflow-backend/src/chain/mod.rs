//! On-chain read support for NFT-gated access.
//!
//! `rpc` talks JSON-RPC `eth_call` to an EVM node, `erc721` builds and decodes
//! the fixed ERC-721 calldata, and `ownership` runs the admin/holder check.

pub mod erc721;
pub mod ownership;

use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub use ownership::{OwnershipCheck, OwnershipVerifier};

/// Per-call timeout for RPC requests
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only JSON-RPC transport. Trait seam so the ownership verifier can be
/// driven by a stub in tests.
#[async_trait]
pub trait JsonRpcClient: Send + Sync {
    /// Make an eth_call (read-only contract call) against the latest block.
    /// An empty return payload (`0x`) is success with an empty vec, distinct
    /// from a transport failure.
    async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, String>;
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: String,
    params: Value,
    id: u64,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<Value>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: u64,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// reqwest-backed JSON-RPC client. One attempt per call, fixed timeout,
/// no retries.
pub struct HttpRpcClient {
    http: reqwest::Client,
    url: String,
}

impl HttpRpcClient {
    pub fn new(url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        HttpRpcClient {
            http,
            url: url.to_string(),
        }
    }

    /// Make a JSON-RPC call and return the `result` member.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, String> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: method.to_string(),
            params,
            id: 1,
        };

        log::debug!("[rpc] {} to {} with params: {:?}", method, self.url, request.params);

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("RPC request failed: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        if !status.is_success() {
            return Err(format!(
                "RPC error ({}) from {}: {}",
                status,
                self.url,
                if body.is_empty() { "empty response" } else { &body }
            ));
        }

        let rpc_response: JsonRpcResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse RPC response: {} - body: {}", e, body))?;

        if let Some(error) = rpc_response.error {
            return Err(format!("RPC error {}: {}", error.code, error.message));
        }

        rpc_response
            .result
            .ok_or_else(|| "RPC returned null result".to_string())
    }
}

#[async_trait]
impl JsonRpcClient for HttpRpcClient {
    async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, String> {
        let params = json!([
            {
                "to": format!("{:?}", to),
                "data": format!("0x{}", hex::encode(data))
            },
            "latest"
        ]);

        let result = self.rpc_call("eth_call", params).await?;

        let hex_str = result
            .as_str()
            .ok_or_else(|| "Invalid eth_call response".to_string())?;

        hex::decode(hex_str.trim_start_matches("0x"))
            .map_err(|e| format!("Failed to decode eth_call result: {}", e))
    }
}
