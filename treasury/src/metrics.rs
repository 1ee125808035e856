//! Prometheus metrics for the treasury service.
//!
//! [`TreasuryMetrics`] owns a dedicated [`Registry`]; [`TreasuryMetrics::render`]
//! encodes it in the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

/// Central collection of treasury service metrics.
pub struct TreasuryMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Blocks walked by historical scans.
    pub scan_blocks: IntCounter,
    /// Treasury spends found by historical scans.
    pub scan_spends_found: IntCounter,
    /// Mempool probes run.
    pub mempool_probes: IntCounter,
    /// Background tally jobs started.
    pub tally_jobs_started: IntCounter,
    /// Background tally jobs that stored a result.
    pub tally_jobs_completed: IntCounter,
    /// Tally requests answered from the cache.
    pub tally_cache_hits: IntCounter,
    /// Blocks walked by tallies, background or synchronous.
    pub tally_blocks: IntCounter,
    /// Ledger calls that failed and were skipped.
    pub fetch_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub active_tally_jobs: IntGauge,
    pub cached_tallies: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of a finished background tally, in seconds.
    pub tally_duration_secs: Histogram,
}

impl TreasuryMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let scan_blocks = register_int_counter_with_registry!(
            Opts::new("pulse_scan_blocks_total", "Blocks walked by historical scans"),
            registry
        )
        .expect("failed to register scan_blocks counter");

        let scan_spends_found = register_int_counter_with_registry!(
            Opts::new(
                "pulse_scan_spends_found_total",
                "Treasury spends found by historical scans"
            ),
            registry
        )
        .expect("failed to register scan_spends_found counter");

        let mempool_probes = register_int_counter_with_registry!(
            Opts::new("pulse_mempool_probes_total", "Mempool probes run"),
            registry
        )
        .expect("failed to register mempool_probes counter");

        let tally_jobs_started = register_int_counter_with_registry!(
            Opts::new("pulse_tally_jobs_started_total", "Background tally jobs started"),
            registry
        )
        .expect("failed to register tally_jobs_started counter");

        let tally_jobs_completed = register_int_counter_with_registry!(
            Opts::new(
                "pulse_tally_jobs_completed_total",
                "Background tally jobs that stored a result"
            ),
            registry
        )
        .expect("failed to register tally_jobs_completed counter");

        let tally_cache_hits = register_int_counter_with_registry!(
            Opts::new("pulse_tally_cache_hits_total", "Tally requests served from cache"),
            registry
        )
        .expect("failed to register tally_cache_hits counter");

        let tally_blocks = register_int_counter_with_registry!(
            Opts::new("pulse_tally_blocks_total", "Blocks walked by vote tallies"),
            registry
        )
        .expect("failed to register tally_blocks counter");

        let fetch_failures = register_int_counter_with_registry!(
            Opts::new(
                "pulse_fetch_failures_total",
                "Ledger calls that failed and were skipped"
            ),
            registry
        )
        .expect("failed to register fetch_failures counter");

        let active_tally_jobs = register_int_gauge_with_registry!(
            Opts::new("pulse_active_tally_jobs", "Tally jobs currently running"),
            registry
        )
        .expect("failed to register active_tally_jobs gauge");

        let cached_tallies = register_int_gauge_with_registry!(
            Opts::new("pulse_cached_tallies", "Finished tallies held in memory"),
            registry
        )
        .expect("failed to register cached_tallies gauge");

        // 0.5 s → ~17 min.
        let tally_duration_secs = register_histogram_with_registry!(
            HistogramOpts::new(
                "pulse_tally_duration_secs",
                "Wall time of a background tally in seconds"
            )
            .buckets(prometheus::exponential_buckets(0.5, 2.0, 12).unwrap()),
            registry
        )
        .expect("failed to register tally_duration_secs histogram");

        Self {
            registry,
            scan_blocks,
            scan_spends_found,
            mempool_probes,
            tally_jobs_started,
            tally_jobs_completed,
            tally_cache_hits,
            tally_blocks,
            fetch_failures,
            active_tally_jobs,
            cached_tallies,
            tally_duration_secs,
        }
    }

    /// Encode every metric in the Prometheus text format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for TreasuryMetrics {
    fn default() -> Self {
        Self::new()
    }
}
