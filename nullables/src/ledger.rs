//! Nullable ledger: an in-memory chain for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

use pulse_ledger::{BlockInfo, LedgerError, LedgerSource, TxRecord};
use pulse_types::{Amount, BlockHash, Timestamp, TxHash};

/// Block time of height 0; each block adds five minutes.
const GENESIS_TIME: u64 = 1_454_954_400;
const BLOCK_SPACING_SECS: u64 = 300;

#[derive(Default)]
struct ChainState {
    tip: Option<i64>,
    tip_fails: bool,
    blocks: BTreeMap<i64, BlockInfo>,
    txs: HashMap<TxHash, TxRecord>,
    mempool: Vec<TxHash>,
    mempool_fails: bool,
    balance: Option<Amount>,
    failing_heights: HashSet<i64>,
    failing_txs: HashSet<TxHash>,
}

/// A deterministic ledger for testing.
///
/// Blocks are created on demand with a hash derived from their height.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    chain: Mutex<ChainState>,
    /// `false` holds every `block_hash_at` call until released.
    gate: watch::Sender<bool>,
    block_fetches: AtomicUsize,
    tx_fetches: AtomicUsize,
}

/// Deterministic hash for the block at `height`.
pub fn block_hash_for(height: i64) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&height.to_be_bytes());
    bytes[31] = 0xbb;
    BlockHash::new(bytes)
}

/// Deterministic timestamp for the block at `height`.
pub fn block_time_for(height: i64) -> Timestamp {
    Timestamp::new(GENESIS_TIME + height.max(0) as u64 * BLOCK_SPACING_SECS)
}

impl NullLedger {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            chain: Mutex::new(ChainState::default()),
            gate,
            block_fetches: AtomicUsize::new(0),
            tx_fetches: AtomicUsize::new(0),
        }
    }

    /// Ensure empty blocks exist for every height in `start..=end`.
    pub fn extend_chain(&self, start: i64, end: i64) {
        let mut chain = self.chain.lock().unwrap();
        for height in start..=end {
            chain.blocks.entry(height).or_insert_with(|| empty_block(height));
        }
    }

    /// Add a regular transaction to the block at `height`.
    pub fn add_regular_tx(&self, height: i64, tx: TxRecord) {
        let mut chain = self.chain.lock().unwrap();
        let block = chain.blocks.entry(height).or_insert_with(|| empty_block(height));
        block.regular_tx_ids.push(tx.txid);
        chain.txs.insert(tx.txid, tx);
    }

    /// Add a stake transaction to the block at `height`.
    pub fn add_stake_tx(&self, height: i64, tx: TxRecord) {
        let mut chain = self.chain.lock().unwrap();
        let block = chain.blocks.entry(height).or_insert_with(|| empty_block(height));
        block.stake_tx_ids.push(tx.txid);
        chain.txs.insert(tx.txid, tx);
    }

    /// Add a transaction to the mempool.
    pub fn add_mempool_tx(&self, tx: TxRecord) {
        let mut chain = self.chain.lock().unwrap();
        chain.mempool.push(tx.txid);
        chain.txs.insert(tx.txid, tx);
    }

    /// List `txid` in the mempool without any retrievable transaction behind it.
    pub fn add_dangling_mempool_id(&self, txid: TxHash) {
        self.chain.lock().unwrap().mempool.push(txid);
    }

    /// Pin the reported chain tip. Defaults to the highest known block.
    pub fn set_tip(&self, height: i64) {
        self.chain.lock().unwrap().tip = Some(height);
    }

    /// Make `current_height` fail.
    pub fn fail_tip(&self, fail: bool) {
        self.chain.lock().unwrap().tip_fails = fail;
    }

    /// Make `block_hash_at(height)` fail.
    pub fn fail_height(&self, height: i64) {
        self.chain.lock().unwrap().failing_heights.insert(height);
    }

    /// Make `transaction_by_hash(txid)` fail.
    pub fn fail_tx(&self, txid: TxHash) {
        self.chain.lock().unwrap().failing_txs.insert(txid);
    }

    /// Make `mempool_tx_ids` fail.
    pub fn fail_mempool(&self, fail: bool) {
        self.chain.lock().unwrap().mempool_fails = fail;
    }

    /// Set the treasury balance; unset balances fail.
    pub fn set_treasury_balance(&self, balance: Amount) {
        self.chain.lock().unwrap().balance = Some(balance);
    }

    /// Hold every subsequent `block_hash_at` call until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held and future calls through.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Number of `block_by_hash` calls served so far.
    pub fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }

    /// Number of `transaction_by_hash` calls served so far.
    pub fn tx_fetches(&self) -> usize {
        self.tx_fetches.load(Ordering::SeqCst)
    }

    fn find_block(&self, hash: &BlockHash) -> Option<BlockInfo> {
        let chain = self.chain.lock().unwrap();
        chain.blocks.values().find(|b| &b.hash == hash).cloned()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_block(height: i64) -> BlockInfo {
    BlockInfo {
        height,
        hash: block_hash_for(height),
        time: block_time_for(height),
        regular_tx_ids: Vec::new(),
        stake_tx_ids: Vec::new(),
    }
}

#[async_trait]
impl LedgerSource for NullLedger {
    async fn current_height(&self) -> Result<i64, LedgerError> {
        let chain = self.chain.lock().unwrap();
        if chain.tip_fails {
            return Err(LedgerError::Request("getblockcount refused".into()));
        }
        Ok(chain
            .tip
            .or_else(|| chain.blocks.keys().next_back().copied())
            .unwrap_or(0))
    }

    async fn block_hash_at(&self, height: i64) -> Result<BlockHash, LedgerError> {
        let mut gate = self.gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(LedgerError::Unavailable("ledger dropped".into()));
        }

        let chain = self.chain.lock().unwrap();
        if chain.failing_heights.contains(&height) {
            return Err(LedgerError::Request(format!("getblockhash {height} refused")));
        }
        chain
            .blocks
            .get(&height)
            .map(|b| b.hash)
            .ok_or_else(|| LedgerError::NotFound(format!("block at height {height}")))
    }

    async fn block_by_hash(&self, hash: &BlockHash) -> Result<BlockInfo, LedgerError> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        self.find_block(hash)
            .ok_or_else(|| LedgerError::NotFound(format!("block {hash}")))
    }

    async fn transaction_by_hash(&self, txid: &TxHash) -> Result<TxRecord, LedgerError> {
        self.tx_fetches.fetch_add(1, Ordering::SeqCst);
        let chain = self.chain.lock().unwrap();
        if chain.failing_txs.contains(txid) {
            return Err(LedgerError::Request(format!("getrawtransaction {txid} refused")));
        }
        chain
            .txs
            .get(txid)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {txid}")))
    }

    async fn mempool_tx_ids(&self) -> Result<Vec<TxHash>, LedgerError> {
        let chain = self.chain.lock().unwrap();
        if chain.mempool_fails {
            return Err(LedgerError::Request("getrawmempool refused".into()));
        }
        Ok(chain.mempool.clone())
    }

    async fn block_header_time(&self, hash: &BlockHash) -> Result<Timestamp, LedgerError> {
        self.find_block(hash)
            .map(|b| b.time)
            .ok_or_else(|| LedgerError::NotFound(format!("header {hash}")))
    }

    async fn treasury_balance(&self) -> Result<Amount, LedgerError> {
        self.chain
            .lock()
            .unwrap()
            .balance
            .ok_or_else(|| LedgerError::Request("gettreasurybalance refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn tip_defaults_to_highest_block() {
        let ledger = NullLedger::new();
        assert_eq!(ledger.current_height().await.unwrap(), 0);
        ledger.extend_chain(10, 20);
        assert_eq!(ledger.current_height().await.unwrap(), 20);
        ledger.set_tip(25);
        assert_eq!(ledger.current_height().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn serves_blocks_and_transactions() {
        let ledger = NullLedger::new();
        let tx = fixtures::regular_tx(fixtures::tx_id(1));
        ledger.add_regular_tx(5, tx.clone());

        let hash = ledger.block_hash_at(5).await.unwrap();
        assert_eq!(hash, block_hash_for(5));
        let block = ledger.block_by_hash(&hash).await.unwrap();
        assert_eq!(block.regular_tx_ids, vec![tx.txid]);
        assert_eq!(ledger.transaction_by_hash(&tx.txid).await.unwrap(), tx);
        assert_eq!(ledger.block_header_time(&hash).await.unwrap(), block_time_for(5));
        assert_eq!(ledger.block_fetches(), 1);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let ledger = NullLedger::new();
        ledger.extend_chain(1, 3);
        ledger.fail_height(2);
        ledger.fail_tip(true);
        ledger.fail_mempool(true);

        assert!(ledger.current_height().await.is_err());
        assert!(ledger.block_hash_at(2).await.is_err());
        assert!(ledger.block_hash_at(3).await.is_ok());
        assert!(ledger.mempool_tx_ids().await.is_err());
        assert!(ledger.treasury_balance().await.is_err());
    }

    #[tokio::test]
    async fn hold_blocks_until_release() {
        let ledger = Arc::new(NullLedger::new());
        ledger.extend_chain(1, 1);
        ledger.hold();

        let pending = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.block_hash_at(1).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        ledger.release();
        assert!(pending.await.unwrap().is_ok());
    }
}
