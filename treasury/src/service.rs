//! The treasury service: one object owning every piece of shared state.

use std::sync::Arc;

use tracing::{info, warn};

use pulse_ledger::LedgerSource;
use pulse_types::{
    Amount, ScanProgress, SpendHistoryRecord, SpendRecord, Timestamp, TreasuryInfo,
    TreasuryParams, TxHash, VoteTallyProgress, VotingTally,
};

use crate::mempool::probe_mempool;
use crate::tally::{TallyRequest, VoteCount};
use crate::{
    HistoricalScanner, ShutdownController, TallyEngine, TreasuryConfig, TreasuryError,
    TreasuryMetrics,
};

/// Treasury spend discovery and vote tallying against one ledger source.
///
/// Every operation is safe to call concurrently. Background work is spawned
/// onto the ambient Tokio runtime and stopped by [`shutdown`](Self::shutdown).
pub struct TreasuryService {
    source: Option<Arc<dyn LedgerSource>>,
    scanner: HistoricalScanner,
    engine: TallyEngine,
    metrics: Arc<TreasuryMetrics>,
    shutdown: ShutdownController,
}

impl TreasuryService {
    /// `source` is `None` when no ledger client is configured; every
    /// operation that needs the ledger then fails with
    /// [`TreasuryError::SourceUnavailable`].
    pub fn new(
        source: Option<Arc<dyn LedgerSource>>,
        params: TreasuryParams,
        tally_cache_capacity: usize,
    ) -> Self {
        let metrics = Arc::new(TreasuryMetrics::new());
        Self {
            source,
            scanner: HistoricalScanner::new(params.clone(), Arc::clone(&metrics)),
            engine: TallyEngine::new(params, tally_cache_capacity, Arc::clone(&metrics)),
            metrics,
            shutdown: ShutdownController::new(),
        }
    }

    pub fn from_config(source: Option<Arc<dyn LedgerSource>>, config: &TreasuryConfig) -> Self {
        Self::new(source, config.params.clone(), config.tally_cache_capacity)
    }

    fn source(&self) -> Result<&Arc<dyn LedgerSource>, TreasuryError> {
        self.source.as_ref().ok_or(TreasuryError::SourceUnavailable)
    }

    // ── Historical scanner ──────────────────────────────────────────────

    /// Start a background scan from `start_height` to the chain tip.
    ///
    /// Fails with [`TreasuryError::ScanInProgress`] if a scan is running.
    pub fn trigger_historical_scan(&self, start_height: i64) -> Result<(), TreasuryError> {
        let source = Arc::clone(self.source()?);
        self.scanner
            .trigger(source, start_height, self.shutdown.subscribe())
    }

    /// Scan progress; spends found since the previous call are handed over once.
    pub fn scan_progress(&self) -> ScanProgress {
        self.scanner.progress()
    }

    pub fn scan_results(&self) -> Vec<SpendHistoryRecord> {
        self.scanner.results()
    }

    /// Wait for the running scan, if any, to finish.
    pub async fn wait_for_scan(&self) {
        self.scanner.wait().await;
    }

    // ── Mempool ─────────────────────────────────────────────────────────

    /// Treasury spends currently in the mempool.
    pub async fn probe_mempool(&self) -> Result<Vec<SpendRecord>, TreasuryError> {
        let source = self.source()?;
        Ok(probe_mempool(source.as_ref(), &self.metrics).await)
    }

    /// Treasury balance plus the spends currently up for vote.
    pub async fn fetch_treasury_info(&self) -> Result<TreasuryInfo, TreasuryError> {
        let source = self.source()?;
        let balance = match source.treasury_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                self.metrics.fetch_failures.inc();
                warn!(error = %e, "failed to get treasury balance; reporting 0");
                Amount::ZERO
            }
        };
        let active_spends = probe_mempool(source.as_ref(), &self.metrics).await;
        info!(%balance, active = active_spends.len(), "treasury info refreshed");
        Ok(TreasuryInfo {
            balance,
            active_spends,
            last_update: Timestamp::now(),
        })
    }

    // ── Vote tallies ────────────────────────────────────────────────────

    /// Vote tally for the treasury spend `tx_hash`.
    ///
    /// For a confirmed spend (`in_mempool == false`) mined at `block_height`
    /// this returns immediately: the cached result, a snapshot of the running
    /// count, or a zero placeholder while a new count starts in the
    /// background. Poll [`tally_progress`](Self::tally_progress) and call
    /// again. A mempool spend expiring at `expiry` is counted before returning.
    pub async fn get_tally(
        &self,
        tx_hash: TxHash,
        block_height: i64,
        expiry: i64,
        in_mempool: bool,
    ) -> Result<VotingTally, TreasuryError> {
        let request = TallyRequest {
            tx_hash,
            block_height,
            expiry,
            in_mempool,
        };
        let shutdown = self.shutdown.subscribe();
        self.engine
            .get_tally(self.source.as_ref(), &request, &shutdown)
            .await
    }

    pub fn tally_progress(&self, tx_hash: &TxHash) -> Option<VoteTallyProgress> {
        self.engine.progress(tx_hash)
    }

    /// Count votes on `tx_hash` over `start..=end` without caching.
    ///
    /// Returns zero counts if the service shuts down mid-count.
    pub async fn count_votes_in_range(
        &self,
        tx_hash: &TxHash,
        start: i64,
        end: i64,
    ) -> Result<VoteCount, TreasuryError> {
        let source = self.source()?;
        let shutdown = self.shutdown.subscribe();
        Ok(self
            .engine
            .count_votes_in_range(source.as_ref(), tx_hash, start, end, &shutdown)
            .await
            .unwrap_or_default())
    }

    pub fn running_tally_jobs(&self) -> usize {
        self.engine.running_jobs()
    }

    pub fn cached_tallies(&self) -> usize {
        self.engine.cached_len()
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    pub fn metrics(&self) -> &TreasuryMetrics {
        &self.metrics
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Stop background scans and tallies at their next block boundary.
    /// A cancelled tally is not cached.
    pub fn shutdown(&self) {
        info!("treasury service shutting down");
        self.shutdown.shutdown();
    }
}
