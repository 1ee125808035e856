//! Error type for parsing fundamental values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
