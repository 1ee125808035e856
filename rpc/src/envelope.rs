//! JSON-RPC 1.0 request and response envelopes, and dcrd result shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::RpcError;

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Vec<Value>,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "1.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Decode a response body, surfacing a node-reported error as
/// [`RpcError::Node`].
pub fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T, RpcError> {
    let response: RpcResponse<T> = serde_json::from_slice(body)
        .map_err(|e| RpcError::InvalidResponse(format!("failed to parse response: {e}")))?;
    if let Some(error) = response.error {
        return Err(RpcError::Node {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse("response has neither result nor error".into()))
}

// ── dcrd result shapes ───────────────────────────────────────────────────

/// `getblockheader` result; only the time is used.
#[derive(Debug, Deserialize)]
pub struct BlockHeaderResult {
    pub time: i64,
}

/// `gettreasurybalance` result; the balance is in atoms.
#[derive(Debug, Deserialize)]
pub struct TreasuryBalanceResult {
    pub balance: i64,
    #[serde(default)]
    pub height: i64,
}

/// `getrawmempool true` result: transaction ids mapped to entry details.
pub type VerboseMempool = BTreeMap<String, Value>;
