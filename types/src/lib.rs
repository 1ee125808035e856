//! Fundamental types for treasury spend discovery and vote tallying.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! hashes, amounts, timestamps, treasury parameters, and the spend/tally records
//! handed back to callers.

pub mod amount;
pub mod block;
pub mod error;
pub mod hash;
pub mod network;
pub mod params;
pub mod spend;
pub mod tally;
pub mod time;

pub use amount::Amount;
pub use block::BlockHash;
pub use error::TypesError;
pub use hash::TxHash;
pub use network::Network;
pub use params::TreasuryParams;
pub use spend::{ScanProgress, SpendHistoryRecord, SpendRecord, TreasuryInfo};
pub use tally::{VoteTallyProgress, VotingTally};
pub use time::Timestamp;
