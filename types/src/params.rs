//! Treasury parameters: protocol constants plus the tunables of the tally engine.
//!
//! Defaults mirror the mainnet consensus rules. Everything except the
//! protocol constants is a cost or estimation knob, not a consensus value.

use serde::{Deserialize, Serialize};

/// Block at which treasury spends were first activated on mainnet.
pub const TREASURY_ACTIVATION_HEIGHT: i64 = 552_448;

/// Nominal number of blocks a treasury spend is voted on.
pub const TREASURY_VOTE_INTERVAL: i64 = 2880;

/// Upper bound on the number of blocks a single tally scans.
pub const MAX_TALLY_SCAN_SPAN: i64 = 3000;

/// Votes expected per block when estimating the eligible electorate.
pub const VOTES_PER_BLOCK: u64 = 5;

/// Tally progress is published at least this often (in scanned blocks).
pub const PROGRESS_INTERVAL: i64 = 50;

/// Parameters consumed by the scanner and the tally engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryParams {
    /// Lowest height a treasury spend can appear at.
    #[serde(default = "default_activation_height")]
    pub activation_height: i64,

    /// Voting window length in blocks.
    #[serde(default = "default_voting_interval")]
    pub voting_interval: i64,

    /// Maximum `end - start` span a tally scans; wider windows keep their
    /// most recent part.
    #[serde(default = "default_max_scan_span")]
    pub max_scan_span: i64,

    /// Estimated votes per block used for eligibility and quorum.
    #[serde(default = "default_votes_per_block")]
    pub votes_per_block: u64,

    /// How often (in blocks) a running tally publishes progress.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: i64,
}

fn default_activation_height() -> i64 {
    TREASURY_ACTIVATION_HEIGHT
}

fn default_voting_interval() -> i64 {
    TREASURY_VOTE_INTERVAL
}

fn default_max_scan_span() -> i64 {
    MAX_TALLY_SCAN_SPAN
}

fn default_votes_per_block() -> u64 {
    VOTES_PER_BLOCK
}

fn default_progress_interval() -> i64 {
    PROGRESS_INTERVAL
}

impl Default for TreasuryParams {
    fn default() -> Self {
        Self {
            activation_height: default_activation_height(),
            voting_interval: default_voting_interval(),
            max_scan_span: default_max_scan_span(),
            votes_per_block: default_votes_per_block(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl TreasuryParams {
    /// Clamp a requested scan start up to the activation floor.
    pub fn clamp_start(&self, height: i64) -> i64 {
        height.max(self.activation_height)
    }
}
