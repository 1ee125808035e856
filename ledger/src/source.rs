//! The ledger data source capability.

use async_trait::async_trait;

use pulse_types::{Amount, BlockHash, Timestamp, TxHash};

use crate::{BlockInfo, LedgerError, TxRecord};

/// Read access to a ledger node.
///
/// Every call may suspend on network I/O; these are the only points where a
/// background scan or tally yields. Implementations must be shareable across
/// tasks.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Height of the current chain tip.
    async fn current_height(&self) -> Result<i64, LedgerError>;

    /// Hash of the main-chain block at `height`.
    async fn block_hash_at(&self, height: i64) -> Result<BlockHash, LedgerError>;

    /// Block summary including regular and stake transaction ids.
    async fn block_by_hash(&self, hash: &BlockHash) -> Result<BlockInfo, LedgerError>;

    /// Verbose transaction record.
    async fn transaction_by_hash(&self, txid: &TxHash) -> Result<TxRecord, LedgerError>;

    /// Ids of every transaction currently in the mempool.
    async fn mempool_tx_ids(&self) -> Result<Vec<TxHash>, LedgerError>;

    /// Timestamp from the header of block `hash`.
    async fn block_header_time(&self, hash: &BlockHash) -> Result<Timestamp, LedgerError>;

    /// Current treasury balance.
    async fn treasury_balance(&self) -> Result<Amount, LedgerError>;
}
