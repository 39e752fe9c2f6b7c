//! JSON-RPC 2.0 transport to an Ethereum node.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The endpoint could not be reached or the connection broke.
    #[error("endpoint unreachable: {0}")]
    Transport(String),

    #[error("endpoint returned HTTP {0}")]
    Http(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A JSON-RPC error object from the node. Reverts arrive here.
    #[error("node error {code}: {message}")]
    Node {
        code: i64,
        message: String,
        data: Option<String>,
    },
}

/// Something that answers JSON-RPC requests.
///
/// The HTTP implementation talks to a real node; tests substitute an
/// in-memory ledger.
pub trait RpcTransport: Send + Sync {
    /// Send one request and return its `result` member (`null` included).
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, RpcError>> + Send;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl From<RpcErrorObject> for RpcError {
    fn from(obj: RpcErrorObject) -> Self {
        let data = obj.data.map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        });
        Self::Node {
            code: obj.code,
            message: obj.message,
            data,
        }
    }
}

/// Parse a JSON-RPC response body into its result.
fn into_result(body: Value) -> Result<Value, RpcError> {
    let response: RpcResponse =
        serde_json::from_value(body).map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
    if let Some(err) = response.error {
        return Err(err.into());
    }
    Ok(response.result.unwrap_or(Value::Null))
}

/// HTTP client for a node's JSON-RPC endpoint.
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(
        url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "json-rpc request");

        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(RpcError::Http(response.status().as_u16()));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.without_url().to_string()))?;
        into_result(json)
    }
}

// ── Hex helpers ─────────────────────────────────────────────────────────

/// Encode an integer as a JSON-RPC quantity (`0x`-prefixed, no leading zeros).
pub fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Encode bytes as JSON-RPC data.
pub fn data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn as_hex_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, RpcError> {
    value
        .as_str()
        .and_then(|s| s.strip_prefix("0x"))
        .ok_or_else(|| RpcError::InvalidResponse(format!("{what} is not a 0x-prefixed string")))
}

pub fn parse_quantity(value: &Value) -> Result<u64, RpcError> {
    let digits = as_hex_str(value, "quantity")?;
    if digits.is_empty() {
        return Err(RpcError::InvalidResponse("empty quantity".into()));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("bad quantity {digits:?}: {e}")))
}

pub fn parse_data(value: &Value) -> Result<Vec<u8>, RpcError> {
    let digits = as_hex_str(value, "data")?;
    hex::decode(digits).map_err(|e| RpcError::InvalidResponse(format!("bad data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_is_extracted() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": "0xaa36a7"});
        assert_eq!(into_result(body).unwrap(), json!("0xaa36a7"));
    }

    #[test]
    fn null_result_is_kept() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": null});
        assert_eq!(into_result(body).unwrap(), Value::Null);
    }

    #[test]
    fn error_object_becomes_node_error() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 3, "message": "execution reverted: not owner", "data": "0x08c379a0"}
        });
        assert_eq!(
            into_result(body).unwrap_err(),
            RpcError::Node {
                code: 3,
                message: "execution reverted: not owner".into(),
                data: Some("0x08c379a0".into()),
            }
        );
    }

    #[test]
    fn malformed_envelope_rejected() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "error": "boom"});
        assert!(matches!(into_result(body), Err(RpcError::InvalidResponse(_))));
    }

    #[test]
    fn quantities() {
        assert_eq!(quantity(0), "0x0");
        assert_eq!(quantity(300_000), "0x493e0");
        assert_eq!(parse_quantity(&json!("0x493e0")).unwrap(), 300_000);
        assert!(parse_quantity(&json!("0x")).is_err());
        assert!(parse_quantity(&json!("493e0")).is_err());
        assert!(parse_quantity(&json!(12)).is_err());
    }

    #[test]
    fn data_roundtrip() {
        assert_eq!(data(&[0xde, 0xad]), "0xdead");
        assert_eq!(parse_data(&json!("0x")).unwrap(), Vec::<u8>::new());
        assert!(parse_data(&json!("0xzz")).is_err());
    }

    #[test]
    fn request_envelope_shape() {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_chainId",
            params: json!([]),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "eth_chainId", "params": []})
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let transport = HttpTransport::new(
            "http://127.0.0.1:1",
            Duration::from_secs(2),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = transport.request("eth_chainId", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
