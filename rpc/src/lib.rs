//! JSON-RPC client for a dcrd ledger node.
//!
//! [`DcrdClient`] implements [`pulse_ledger::LedgerSource`] over dcrd's
//! JSON-RPC 1.0 interface:
//! - HTTP basic authentication
//! - an optional extra root certificate for dcrd's self-signed `rpc.cert`
//! - per-request and connect timeouts

pub mod client;
pub mod envelope;
pub mod error;

pub use client::{DcrdClient, DcrdClientConfig};
pub use error::RpcError;
