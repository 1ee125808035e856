//! RPC client error types.

use pulse_ledger::LedgerError;
use thiserror::Error;

/// dcrd's code for an unknown block or transaction.
pub const ERR_NO_INFO: i64 = -5;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("node unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("authentication rejected")]
    Unauthorized,

    #[error("HTTP status {0}")]
    Http(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("certificate error: {0}")]
    Certificate(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            RpcError::Unreachable(format!("connection failed: {e}"))
        } else {
            RpcError::Request(e.to_string())
        }
    }
}

impl From<RpcError> for LedgerError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Unreachable(msg) => LedgerError::Unavailable(msg),
            RpcError::Certificate(msg) => LedgerError::Unavailable(msg),
            RpcError::InvalidResponse(msg) => LedgerError::InvalidResponse(msg),
            RpcError::Node { code, message } if code == ERR_NO_INFO => LedgerError::NotFound(message),
            RpcError::Node { code, message } => LedgerError::Node { code, message },
            other => LedgerError::Request(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_ledger_errors() {
        assert!(matches!(
            LedgerError::from(RpcError::Unreachable("refused".into())),
            LedgerError::Unavailable(_)
        ));
        assert!(matches!(
            LedgerError::from(RpcError::Node {
                code: ERR_NO_INFO,
                message: "No information available about transaction".into()
            }),
            LedgerError::NotFound(_)
        ));
        assert!(matches!(
            LedgerError::from(RpcError::Node {
                code: -32601,
                message: "Method not found".into()
            }),
            LedgerError::Node { code: -32601, .. }
        ));
        assert!(matches!(
            LedgerError::from(RpcError::Unauthorized),
            LedgerError::Request(_)
        ));
    }
}
