//! Historical scanner: walks the chain from a start height to the tip,
//! collecting every mined treasury spend.
//!
//! At most one scan runs at a time. Callers trigger a scan and then poll
//! [`HistoricalScanner::progress`]; each poll hands over the spends found
//! since the previous poll exactly once.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pulse_governance::{history_record, is_treasury_spend};
use pulse_ledger::LedgerSource;
use pulse_types::{ScanProgress, SpendHistoryRecord, TreasuryParams};

use crate::shutdown::is_cancelled;
use crate::{TreasuryError, TreasuryMetrics};

#[derive(Default)]
struct ScanState {
    running: bool,
    current_height: i64,
    /// Tip observed when the scan started; 0 until known.
    total_height: i64,
    results: Vec<SpendHistoryRecord>,
    /// Found since the last progress read.
    fresh: Vec<SpendHistoryRecord>,
}

pub struct HistoricalScanner {
    state: Arc<RwLock<ScanState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    params: TreasuryParams,
    metrics: Arc<TreasuryMetrics>,
}

impl HistoricalScanner {
    pub fn new(params: TreasuryParams, metrics: Arc<TreasuryMetrics>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ScanState::default())),
            task: Mutex::new(None),
            params,
            metrics,
        }
    }

    /// Start a background scan from `start_height` (raised to the activation
    /// height) up to the chain tip.
    ///
    /// Results of any previous scan are discarded. Must be called from
    /// within a Tokio runtime.
    pub fn trigger(
        &self,
        source: Arc<dyn LedgerSource>,
        start_height: i64,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), TreasuryError> {
        let start = self.params.clamp_start(start_height);
        {
            let mut state = crate::write(&self.state);
            if state.running {
                return Err(TreasuryError::ScanInProgress);
            }
            *state = ScanState {
                running: true,
                current_height: start,
                ..ScanState::default()
            };
        }

        info!(start, "historical treasury scan triggered");
        let run = ScanRun {
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            source,
            shutdown,
        };
        let handle = tokio::spawn(run.execute(start));
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    /// Current progress, handing over spends found since the last call.
    pub fn progress(&self) -> ScanProgress {
        let mut state = crate::write(&self.state);
        let new_spends = std::mem::take(&mut state.fresh);
        let found = state.results.len();

        let message = if state.running {
            "Scanning blockchain for treasury spends...".to_string()
        } else if found > 0 {
            format!("Scan complete. Found {found} treasury spends")
        } else {
            "No scan in progress".to_string()
        };

        ScanProgress {
            is_scanning: state.running,
            current_height: state.current_height,
            total_height: state.total_height,
            progress: self.percent(state.current_height, state.total_height),
            found,
            new_spends,
            message,
        }
    }

    /// Every spend found by the latest scan, in discovery order.
    pub fn results(&self) -> Vec<SpendHistoryRecord> {
        crate::read(&self.state).results.clone()
    }

    pub fn is_running(&self) -> bool {
        crate::read(&self.state).running
    }

    /// Wait for the latest scan task to finish.
    pub async fn wait(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "historical scan task failed");
            }
        }
    }

    fn percent(&self, current: i64, total: i64) -> f64 {
        let floor = self.params.activation_height;
        if total <= floor {
            return 0.0;
        }
        let pct = (current - floor) as f64 / (total - floor) as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }
}

/// Clears the running flag however the scan task ends.
struct RunningGuard(Arc<RwLock<ScanState>>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        crate::write(&self.0).running = false;
    }
}

struct ScanRun {
    state: Arc<RwLock<ScanState>>,
    metrics: Arc<TreasuryMetrics>,
    source: Arc<dyn LedgerSource>,
    shutdown: watch::Receiver<bool>,
}

impl ScanRun {
    async fn execute(self, start: i64) {
        let _running = RunningGuard(Arc::clone(&self.state));

        let tip = match self.source.current_height().await {
            Ok(tip) => tip,
            Err(e) => {
                self.metrics.fetch_failures.inc();
                warn!(error = %e, "failed to get current height; historical scan aborted");
                return;
            }
        };
        crate::write(&self.state).total_height = tip;
        info!(start, tip, "scanning for treasury spends");

        for height in start..=tip {
            if is_cancelled(&self.shutdown) {
                info!(height, "historical scan cancelled");
                return;
            }

            let found = self.scan_height(height).await;
            self.metrics.scan_blocks.inc();

            let mut state = crate::write(&self.state);
            state.current_height = height;
            if !found.is_empty() {
                self.metrics.scan_spends_found.inc_by(found.len() as u64);
                state.fresh.extend(found.iter().cloned());
                state.results.extend(found);
            }
        }

        let found = crate::read(&self.state).results.len();
        info!(found, "historical scan complete");
    }

    /// Spends mined at `height`. Failed lookups skip the block or transaction.
    async fn scan_height(&self, height: i64) -> Vec<SpendHistoryRecord> {
        let hash = match self.source.block_hash_at(height).await {
            Ok(hash) => hash,
            Err(e) => {
                self.metrics.fetch_failures.inc();
                debug!(height, error = %e, "skipping block: hash lookup failed");
                return Vec::new();
            }
        };
        let block = match self.source.block_by_hash(&hash).await {
            Ok(block) => block,
            Err(e) => {
                self.metrics.fetch_failures.inc();
                debug!(height, %hash, error = %e, "skipping block: fetch failed");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for txid in block.all_tx_ids() {
            let tx = match self.source.transaction_by_hash(txid).await {
                Ok(tx) => tx,
                Err(e) => {
                    self.metrics.fetch_failures.inc();
                    debug!(height, %txid, error = %e, "skipping transaction: fetch failed");
                    continue;
                }
            };
            if is_treasury_spend(&tx) {
                let record = history_record(&tx, &block);
                info!(
                    height,
                    txid = %record.tx_hash,
                    amount = %record.amount,
                    "found treasury spend"
                );
                found.push(record);
            }
        }
        found
    }
}
