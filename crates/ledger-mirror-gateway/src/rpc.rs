//! Minimal JSON-RPC 2.0 client over HTTP.
//!
//! One pooled `reqwest::Client` is shared by all concurrent calls. The client
//! never retries; every failure goes back to the caller.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{GatewayError, Result};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC client bound to one node endpoint.
pub struct RpcClient {
    http: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Validate the endpoint and build the HTTP client. No request is sent.
    pub fn new(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| GatewayError::Config(format!("invalid node URL {:?}: {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::Config(format!(
                "node URL must be http or https, got {}",
                url.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one request and decode its `result`.
    ///
    /// Transport faults and node-reported errors come back as `Unavailable`;
    /// responses that do not decode come back as `Malformed`.
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "json-rpc request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("{}: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Unavailable(format!(
                "{}: http status {}",
                method, status
            )));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(format!("{}: {}", method, e)))?;

        if let Some(err) = envelope.error {
            let detail = match err.data {
                Some(data) => format!(" ({})", data),
                None => String::new(),
            };
            return Err(GatewayError::Unavailable(format!(
                "{}: node error {}: {}{}",
                method, err.code, err.message, detail
            )));
        }

        let result = envelope
            .result
            .ok_or_else(|| GatewayError::Malformed(format!("{}: response has no result", method)))?;

        serde_json::from_value(result)
            .map_err(|e| GatewayError::Malformed(format!("{}: {}", method, e)))
    }
}

/// Parse a hex quantity (`0x`-prefixed, no leading zeros required).
pub fn parse_quantity(method: &str, s: &str) -> Result<u128> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| GatewayError::Malformed(format!("{}: quantity {:?} lacks 0x", method, s)))?;
    if digits.is_empty() {
        return Err(GatewayError::Malformed(format!("{}: empty quantity", method)));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| GatewayError::Malformed(format!("{}: quantity {:?}: {}", method, s, e)))
}

/// Parse a hex quantity that must fit in 64 bits.
pub fn parse_quantity_u64(method: &str, s: &str) -> Result<u64> {
    let value = parse_quantity(method, s)?;
    u64::try_from(value)
        .map_err(|_| GatewayError::Malformed(format!("{}: quantity {} exceeds u64", method, s)))
}
