//! Treasury spend records produced by the mempool probe and the historical scan.

use serde::{Deserialize, Serialize};

use crate::{Amount, BlockHash, Timestamp, TxHash};

/// Status label of a spend still waiting in the mempool.
pub const STATUS_VOTING: &str = "voting";

/// Vote result recorded on every historical spend.
pub const VOTE_RESULT_APPROVED: &str = "approved";

/// A treasury spend currently pending in the mempool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub tx_hash: TxHash,
    /// Sum of every output value.
    pub amount: Amount,
    /// First payee address found across the outputs (empty when none).
    pub payee: String,
    pub expiry_height: i64,
    pub current_height: i64,
    /// `expiry_height - current_height`; negative once expired.
    pub blocks_remaining: i64,
    pub status: String,
    pub detected_at: Timestamp,
}

/// A treasury spend confirmed in a block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpendHistoryRecord {
    pub tx_hash: TxHash,
    pub amount: Amount,
    pub payee: String,
    pub block_height: i64,
    pub block_hash: BlockHash,
    pub timestamp: Timestamp,
    pub vote_result: String,
}

/// Snapshot of the historical scanner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub is_scanning: bool,
    pub current_height: i64,
    pub total_height: i64,
    /// Percent complete, within `[0, 100]`.
    pub progress: f64,
    pub found: usize,
    /// Spends found since the previous progress read.
    pub new_spends: Vec<SpendHistoryRecord>,
    pub message: String,
}

/// Treasury overview: balance plus the spends currently up for vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreasuryInfo {
    pub balance: Amount,
    pub active_spends: Vec<SpendRecord>,
    pub last_update: Timestamp,
}
