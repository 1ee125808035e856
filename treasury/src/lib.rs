//! Treasury spend scanner and vote tally engine.
//!
//! The [`TreasuryService`] is the entry point. It owns:
//! - a [`HistoricalScanner`]: one background scan of the chain at a time,
//!   polled through [`ScanProgress`](pulse_types::ScanProgress) snapshots;
//! - a [`TallyEngine`]: at most one background vote count per treasury
//!   spend, with results cached for confirmed spends;
//! - the [mempool prober](mempool::probe_mempool) for spends still up for vote.
//!
//! Callers never block on a scan or a count; they trigger and then poll.
//! The only suspension points are calls into the
//! [`LedgerSource`](pulse_ledger::LedgerSource).

pub mod cache;
pub mod config;
pub mod error;
pub mod mempool;
pub mod metrics;
pub mod progress;
pub mod registry;
pub mod scanner;
pub mod service;
pub mod shutdown;
pub mod tally;
pub mod window;

pub use cache::TallyCache;
pub use config::TreasuryConfig;
pub use error::TreasuryError;
pub use metrics::TreasuryMetrics;
pub use progress::ProgressBoard;
pub use registry::JobRegistry;
pub use scanner::HistoricalScanner;
pub use service::TreasuryService;
pub use shutdown::ShutdownController;
pub use tally::{TallyEngine, TallyRequest, VoteCount};
pub use window::{TallyStats, VotingWindow};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read a shared structure, recovering the data if a writer panicked.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write a shared structure, recovering the data if a writer panicked.
pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
