// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! JSON-RPC 2.0 over HTTP.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::abi;

/// Wallet-side code for a user declining a request.
pub const USER_REJECTED_CODE: i64 = 4001;
/// Node-side code for `execution reverted`.
pub const EXECUTION_REVERTED_CODE: i64 = 3;
pub const NO_PARAMS: [(); 0] = [];

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http status {status} from {method}")]
    Http { method: String, status: u16 },
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("unexpected result for {method}: {reason}")]
    Decode { method: String, reason: String },
}

impl TransportError {
    /// Connection and timeout failures; the request may succeed if repeated.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Request(err) => err.is_connect() || err.is_timeout(),
            TransportError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Error, PartialEq)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn is_revert(&self) -> bool {
        self.code == EXECUTION_REVERTED_CODE || self.message.to_lowercase().contains("revert")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }

    /// Raw revert payload if the node attached one.
    pub fn revert_data(&self) -> Option<Vec<u8>> {
        let raw = match self.data.as_ref()? {
            serde_json::Value::String(s) => s.as_str(),
            serde_json::Value::Object(map) => map.get("data")?.as_str()?,
            _ => return None,
        };
        decode_data(raw).ok()
    }

    /// Human-readable revert reason, falling back to the node's message.
    pub fn revert_reason(&self) -> String {
        self.revert_data()
            .and_then(|data| abi::decode_revert_reason(&data))
            .unwrap_or_else(|| {
                self.message
                    .trim_start_matches("execution reverted:")
                    .trim()
                    .to_string()
            })
    }
}

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<RpcError>,
}

pub struct JsonRpcTransport {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, url)
    }

    pub fn with_client(client: Client, url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            client,
            url: Url::parse(url)?,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// A `null` result deserializes into `R` as-is, so `Option<_>` results see `None`.
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R, TransportError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let resp = self.client.post(self.url.clone()).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(TransportError::Http {
                method: method.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let parsed: RpcResponse = resp.json().await?;
        if let Some(err) = parsed.error {
            return Err(TransportError::Rpc(err));
        }
        serde_json::from_value(parsed.result).map_err(|err| TransportError::Decode {
            method: method.to_string(),
            reason: err.to_string(),
        })
    }

    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let raw: String = self.request("eth_chainId", NO_PARAMS).await?;
        parse_quantity(&raw).map_err(|reason| TransportError::Decode {
            method: "eth_chainId".to_string(),
            reason,
        })
    }

    pub async fn block_number(&self) -> Result<u64, TransportError> {
        let raw: String = self.request("eth_blockNumber", NO_PARAMS).await?;
        parse_quantity(&raw).map_err(|reason| TransportError::Decode {
            method: "eth_blockNumber".to_string(),
            reason,
        })
    }
}

pub fn encode_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn decode_data(raw: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
}

pub fn quantity(value: u64) -> String {
    format!("{value:#x}")
}

pub fn parse_quantity(raw: &str) -> Result<u64, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity {raw} is missing 0x prefix"))?;
    if digits.is_empty() {
        return Err("empty quantity".to_string());
    }
    u64::from_str_radix(digits, 16).map_err(|err| format!("invalid quantity {raw}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantities_use_minimal_hex() {
        assert_eq!(quantity(0), "0x0");
        assert_eq!(quantity(84_532), "0x14a34");
        assert_eq!(parse_quantity("0x14a34"), Ok(84_532));
        assert!(parse_quantity("14a34").is_err());
        assert!(parse_quantity("0x").is_err());
    }

    #[test]
    fn data_hex_round_trips_prefix() {
        assert_eq!(encode_data(&[0xab, 0x01]), "0xab01");
        assert_eq!(decode_data("0xab01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(decode_data("ab01").unwrap(), vec![0xab, 0x01]);
    }

    #[test]
    fn revert_reason_prefers_encoded_payload() {
        let err: RpcError = serde_json::from_value(json!({
            "code": 3,
            "message": "execution reverted: Poll has ended",
            "data": "0x08c379a0\
                     0000000000000000000000000000000000000000000000000000000000000020\
                     000000000000000000000000000000000000000000000000000000000000000e\
                     506f6c6c2068617320656e646564000000000000000000000000000000000000"
        }))
        .unwrap();
        assert!(err.is_revert());
        assert_eq!(err.revert_reason(), "Poll has ended");
    }

    #[test]
    fn revert_reason_falls_back_to_message() {
        let err = RpcError {
            code: -32000,
            message: "execution reverted: Already voted".to_string(),
            data: None,
        };
        assert!(err.is_revert());
        assert_eq!(err.revert_reason(), "Already voted");
    }

    #[test]
    fn user_rejection_is_detected() {
        let err = RpcError {
            code: USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
            data: None,
        };
        assert!(err.is_user_rejection());
        assert!(!err.is_revert());
    }
}
