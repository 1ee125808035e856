use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger source unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
}
