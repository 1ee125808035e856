//! Vote tally engine.
//!
//! Counting votes means walking every block of a voting window and decoding
//! each vote in it, which takes minutes over RPC. Confirmed spends are
//! therefore counted by a background job; callers get a placeholder, then a
//! live snapshot, then the cached result. Spends still in the mempool are
//! counted synchronously and never cached, since their window keeps moving.
//!
//! Per treasury spend:
//! - at most one job is registered at a time;
//! - published progress never decreases while the job runs;
//! - a cached result is never replaced;
//! - the final progress record is published after the result is cached,
//!   and the job deregisters last.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use pulse_governance::{find_vote, is_vote_transaction, VoteChoice};
use pulse_ledger::LedgerSource;
use pulse_types::{Timestamp, TreasuryParams, TxHash, VoteTallyProgress, VotingTally};

use crate::cache::{CacheInsert, TallyCache};
use crate::progress::ProgressBoard;
use crate::registry::{JobGuard, JobRegistry};
use crate::shutdown::is_cancelled;
use crate::window::{TallyStats, VotingWindow};
use crate::{TreasuryError, TreasuryMetrics};

/// A request for the tally of one treasury spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TallyRequest {
    pub tx_hash: TxHash,
    /// Height the spend was mined at; ignored for mempool spends.
    pub block_height: i64,
    /// Expiry height; only used for mempool spends.
    pub expiry: i64,
    pub in_mempool: bool,
}

/// Yes and no votes counted over a range of blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteCount {
    pub yes: u64,
    pub no: u64,
}

impl VoteCount {
    fn record(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Yes => self.yes += 1,
            VoteChoice::No => self.no += 1,
            _ => {}
        }
    }
}

pub struct TallyEngine {
    params: TreasuryParams,
    jobs: Arc<RwLock<JobRegistry>>,
    progress: Arc<RwLock<ProgressBoard>>,
    cache: Arc<RwLock<TallyCache>>,
    metrics: Arc<TreasuryMetrics>,
}

impl TallyEngine {
    pub fn new(params: TreasuryParams, cache_capacity: usize, metrics: Arc<TreasuryMetrics>) -> Self {
        Self {
            params,
            jobs: Arc::new(RwLock::new(JobRegistry::new())),
            progress: Arc::new(RwLock::new(ProgressBoard::new())),
            cache: Arc::new(RwLock::new(TallyCache::new(cache_capacity))),
            metrics,
        }
    }

    /// The tally for `request`, in order of preference:
    ///
    /// 1. the cached result of a confirmed spend;
    /// 2. a snapshot of the job already counting the spend;
    /// 3. for a mempool spend, a synchronous count;
    /// 4. otherwise a zero placeholder, with a background job started.
    ///
    /// Jobs are spawned onto the current Tokio runtime.
    pub async fn get_tally(
        &self,
        source: Option<&Arc<dyn LedgerSource>>,
        request: &TallyRequest,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<VotingTally, TreasuryError> {
        if !request.in_mempool {
            if let Some(tally) = self.cached(&request.tx_hash) {
                return Ok(tally);
            }
        }
        if let Some(snapshot) = self.running_snapshot(request) {
            return Ok(snapshot);
        }

        let source = source.ok_or(TreasuryError::SourceUnavailable)?;
        if request.in_mempool {
            return self.count_mempool(source.as_ref(), request, shutdown).await;
        }
        Ok(self.start_job(Arc::clone(source), request, shutdown.clone()))
    }

    /// Latest progress published for `tx_hash`.
    pub fn progress(&self, tx_hash: &TxHash) -> Option<VoteTallyProgress> {
        crate::read(&self.progress).get(tx_hash).cloned()
    }

    /// Count votes on `target` over `start..=end`, capped to the most recent
    /// `max_scan_span` blocks. Returns `None` if cancelled.
    pub async fn count_votes_in_range(
        &self,
        source: &dyn LedgerSource,
        target: &TxHash,
        start: i64,
        end: i64,
        shutdown: &watch::Receiver<bool>,
    ) -> Option<VoteCount> {
        let window = VotingWindow {
            start,
            end,
            complete: false,
        }
        .bounded(self.params.max_scan_span);
        count_votes(source, target, &window, &self.metrics, shutdown, |_, _, _| {}).await
    }

    pub fn running_jobs(&self) -> usize {
        crate::read(&self.jobs).len()
    }

    pub fn is_running(&self, tx_hash: &TxHash) -> bool {
        crate::read(&self.jobs).contains(tx_hash)
    }

    pub fn cached_len(&self) -> usize {
        crate::read(&self.cache).len()
    }

    fn cached(&self, tx_hash: &TxHash) -> Option<VotingTally> {
        let tally = crate::read(&self.cache).get(tx_hash).cloned()?;
        self.metrics.tally_cache_hits.inc();
        debug!(tx = %tx_hash, "tally served from cache");
        Some(tally)
    }

    /// Snapshot of the running job for `request`, if any.
    fn running_snapshot(&self, request: &TallyRequest) -> Option<VotingTally> {
        if !self.is_running(&request.tx_hash) {
            return None;
        }
        let tally = match self.progress(&request.tx_hash) {
            Some(progress) => snapshot(&progress, request),
            None => {
                let window = VotingWindow::confirmed(request.block_height, &self.params);
                VotingTally::placeholder(window.start, window.end, request.in_mempool)
            }
        };
        Some(tally)
    }

    fn start_job(
        &self,
        source: Arc<dyn LedgerSource>,
        request: &TallyRequest,
        shutdown: watch::Receiver<bool>,
    ) -> VotingTally {
        let hash = request.tx_hash;
        let window = VotingWindow::confirmed(request.block_height, &self.params);
        let placeholder = VotingTally::placeholder(window.start, window.end, false);

        let Some(guard) = JobGuard::acquire(&self.jobs, hash) else {
            // Another caller registered first.
            return self
                .running_snapshot(request)
                .or_else(|| self.cached(&hash))
                .unwrap_or(placeholder);
        };
        if let Some(tally) = self.cached(&hash) {
            // A job finished between the cache check and registration.
            return tally;
        }

        crate::write(&self.progress).publish(
            hash,
            VoteTallyProgress {
                is_parsing: true,
                progress: 0.0,
                current_block: window.start,
                total_blocks: window.blocks(),
                message: "Starting vote count...".to_string(),
                ..VoteTallyProgress::default()
            },
        );

        self.metrics.tally_jobs_started.inc();
        self.metrics.active_tally_jobs.inc();
        info!(
            tx = %hash,
            start = window.start,
            end = window.end,
            blocks = window.blocks(),
            "starting vote count"
        );

        let job = TallyJob {
            hash,
            window,
            votes_per_block: self.params.votes_per_block,
            progress_interval: self.params.progress_interval.max(1),
            source,
            progress: Arc::clone(&self.progress),
            cache: Arc::clone(&self.cache),
            metrics: Arc::clone(&self.metrics),
            shutdown,
        };
        tokio::spawn(job.run(guard));

        placeholder
    }

    async fn count_mempool(
        &self,
        source: &dyn LedgerSource,
        request: &TallyRequest,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<VotingTally, TreasuryError> {
        let tip = source
            .current_height()
            .await
            .map_err(TreasuryError::ChainTip)?;
        let window = VotingWindow::mempool(tip, request.expiry, &self.params);
        debug!(
            tx = %request.tx_hash,
            start = window.start,
            end = window.end,
            "counting mempool spend votes"
        );

        let Some(count) =
            count_votes(source, &request.tx_hash, &window, &self.metrics, shutdown, |_, _, _| {})
                .await
        else {
            return Ok(VotingTally::placeholder(window.start, window.end, true));
        };

        let mut tally = build_tally(&window, count, self.params.votes_per_block, true);
        tally.voting_start_time = block_time(source, window.start).await;
        tally.voting_end_time = block_time(source, window.end).await;
        Ok(tally)
    }
}

/// Interpolate a partial tally from a running job's progress.
fn snapshot(progress: &VoteTallyProgress, request: &TallyRequest) -> VotingTally {
    let processed = (progress.progress / 100.0 * progress.total_blocks as f64).round() as i64;
    let start = progress.current_block - (processed - 1).max(0);
    VotingTally {
        voting_start_block: start,
        voting_end_block: request.block_height,
        yes_votes: progress.yes_votes,
        no_votes: progress.no_votes,
        votes_cast: progress.yes_votes + progress.no_votes,
        voting_complete: false,
        in_mempool: request.in_mempool,
        ..VotingTally::default()
    }
}

fn build_tally(window: &VotingWindow, count: VoteCount, votes_per_block: u64, in_mempool: bool) -> VotingTally {
    let stats = TallyStats::compute(count.yes, count.no, window, votes_per_block);
    VotingTally {
        voting_start_block: window.start,
        voting_end_block: window.end,
        yes_votes: count.yes,
        no_votes: count.no,
        votes_cast: stats.votes_cast,
        eligible_votes: stats.eligible_votes,
        quorum_required: stats.quorum_required,
        quorum_achieved: stats.quorum_achieved,
        approval_rate: stats.approval_rate,
        turnout_rate: stats.turnout_rate,
        voting_complete: window.complete,
        in_mempool,
        voting_start_time: None,
        voting_end_time: None,
    }
}

/// Walk `window`, counting votes on `target`. `on_block` is called after
/// every height with the height, the blocks processed so far and the
/// running count. Returns `None` if cancelled.
async fn count_votes<F>(
    source: &dyn LedgerSource,
    target: &TxHash,
    window: &VotingWindow,
    metrics: &TreasuryMetrics,
    shutdown: &watch::Receiver<bool>,
    mut on_block: F,
) -> Option<VoteCount>
where
    F: FnMut(i64, i64, &VoteCount),
{
    let mut count = VoteCount::default();
    let mut processed = 0;
    for height in window.heights() {
        if is_cancelled(shutdown) {
            return None;
        }
        count_block(source, target, height, &mut count, metrics).await;
        metrics.tally_blocks.inc();
        processed += 1;
        on_block(height, processed, &count);
    }
    Some(count)
}

/// Count the votes on `target` in the stake tree at `height`. Failed
/// lookups skip the block or transaction.
async fn count_block(
    source: &dyn LedgerSource,
    target: &TxHash,
    height: i64,
    count: &mut VoteCount,
    metrics: &TreasuryMetrics,
) {
    let hash = match source.block_hash_at(height).await {
        Ok(hash) => hash,
        Err(e) => {
            metrics.fetch_failures.inc();
            debug!(height, error = %e, "skipping block: hash lookup failed");
            return;
        }
    };
    let block = match source.block_by_hash(&hash).await {
        Ok(block) => block,
        Err(e) => {
            metrics.fetch_failures.inc();
            debug!(height, error = %e, "skipping block: fetch failed");
            return;
        }
    };

    for txid in &block.stake_tx_ids {
        match source.transaction_by_hash(txid).await {
            Ok(tx) if is_vote_transaction(&tx) => count.record(find_vote(&tx, target)),
            Ok(_) => {}
            Err(e) => {
                metrics.fetch_failures.inc();
                debug!(height, tx = %txid, error = %e, "skipping stake transaction");
            }
        }
    }
}

/// Timestamp of the block at `height`, if it can be looked up.
async fn block_time(source: &dyn LedgerSource, height: i64) -> Option<Timestamp> {
    let hash = match source.block_hash_at(height).await {
        Ok(hash) => hash,
        Err(e) => {
            debug!(height, error = %e, "no block timestamp");
            return None;
        }
    };
    match source.block_header_time(&hash).await {
        Ok(time) => Some(time),
        Err(e) => {
            debug!(height, error = %e, "no block timestamp");
            None
        }
    }
}

struct TallyJob {
    hash: TxHash,
    window: VotingWindow,
    votes_per_block: u64,
    progress_interval: i64,
    source: Arc<dyn LedgerSource>,
    progress: Arc<RwLock<ProgressBoard>>,
    cache: Arc<RwLock<TallyCache>>,
    metrics: Arc<TreasuryMetrics>,
    shutdown: watch::Receiver<bool>,
}

impl TallyJob {
    async fn run(self, guard: JobGuard) {
        self.count_and_store().await;
        self.metrics.active_tally_jobs.dec();
        drop(guard);
    }

    async fn count_and_store(&self) {
        let started = Instant::now();
        let total = self.window.blocks();

        let publish = |height: i64, processed: i64, count: &VoteCount| {
            if processed % self.progress_interval != 0 && height != self.window.end {
                return;
            }
            let elapsed = started.elapsed().as_secs_f64();
            let remaining = (total - processed).max(0) as f64;
            let estimated_secs = (elapsed / processed as f64 * remaining).round() as u64;
            crate::write(&self.progress).publish(
                self.hash,
                VoteTallyProgress {
                    is_parsing: true,
                    progress: processed as f64 / total as f64 * 100.0,
                    current_block: height,
                    total_blocks: total,
                    yes_votes: count.yes,
                    no_votes: count.no,
                    estimated_secs,
                    message: format!("Scanning block {height} of {}...", self.window.end),
                },
            );
        };

        let Some(count) = count_votes(
            self.source.as_ref(),
            &self.hash,
            &self.window,
            &self.metrics,
            &self.shutdown,
            publish,
        )
        .await
        else {
            info!(tx = %self.hash, "vote count cancelled");
            return;
        };

        let mut tally = build_tally(&self.window, count, self.votes_per_block, false);
        tally.voting_start_time = block_time(self.source.as_ref(), self.window.start).await;
        tally.voting_end_time = block_time(self.source.as_ref(), self.window.end).await;

        let outcome = crate::write(&self.cache).insert(self.hash, tally.clone());
        match outcome {
            CacheInsert::Stored { evicted: Some(old) } => {
                crate::write(&self.progress).remove(&old);
                debug!(tx = %old, "evicted oldest cached tally");
            }
            CacheInsert::Stored { evicted: None } => {}
            CacheInsert::AlreadyPresent => {
                warn!(tx = %self.hash, "tally already cached; keeping the stored result");
            }
        }
        self.metrics
            .cached_tallies
            .set(crate::read(&self.cache).len() as i64);

        crate::write(&self.progress).publish(
            self.hash,
            VoteTallyProgress {
                is_parsing: false,
                progress: 100.0,
                current_block: self.window.end,
                total_blocks: total,
                yes_votes: count.yes,
                no_votes: count.no,
                estimated_secs: 0,
                message: "Vote counting complete".to_string(),
            },
        );

        let elapsed = started.elapsed();
        self.metrics.tally_jobs_completed.inc();
        self.metrics.tally_duration_secs.observe(elapsed.as_secs_f64());
        info!(
            tx = %self.hash,
            yes = tally.yes_votes,
            no = tally.no_votes,
            approval = tally.approval_rate,
            turnout = tally.turnout_rate,
            quorum = tally.quorum_achieved,
            elapsed = %pulse_utils::format_duration(elapsed.as_secs()),
            "vote count complete"
        );
    }
}
