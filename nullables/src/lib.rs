//! Nullable infrastructure for deterministic testing.
//!
//! The ledger node is abstracted behind [`pulse_ledger::LedgerSource`]. This
//! crate provides a test-friendly implementation that:
//! - Returns deterministic blocks, transactions and mempool contents
//! - Can inject failures per height, per transaction, or for the chain tip
//! - Can hold callers at a gate so background jobs stay observably "running"
//! - Never touches the network
//!
//! Usage: hand a [`NullLedger`] to the treasury service in place of the RPC client.

pub mod fixtures;
pub mod ledger;

pub use ledger::{block_hash_for, block_time_for, NullLedger};
