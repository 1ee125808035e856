//! Voting windows and the statistics derived from a vote count.

use serde::{Deserialize, Serialize};

use pulse_types::TreasuryParams;

/// Quorum is one fifth of the eligible votes.
const QUORUM_DIVISOR: u64 = 5;

/// Inclusive block range a tally covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub start: i64,
    pub end: i64,
    /// Whether voting on the spend has ended.
    pub complete: bool,
}

impl VotingWindow {
    /// Window of a spend mined at `block_height`: the voting interval before
    /// it, never reaching below the activation height.
    pub fn confirmed(block_height: i64, params: &TreasuryParams) -> Self {
        Self {
            start: params.clamp_start(block_height - params.voting_interval),
            end: block_height,
            complete: true,
        }
        .bounded(params.max_scan_span)
    }

    /// Window of a spend still in the mempool: from one voting interval
    /// before the tip up to the spend's expiry.
    pub fn mempool(tip: i64, expiry: i64, params: &TreasuryParams) -> Self {
        Self {
            start: (tip - params.voting_interval).max(0),
            end: expiry,
            complete: false,
        }
        .bounded(params.max_scan_span)
    }

    /// Keep the most recent `max_span` blocks of a wider window.
    pub fn bounded(self, max_span: i64) -> Self {
        if self.end - self.start > max_span {
            Self {
                start: self.end - max_span,
                ..self
            }
        } else {
            self
        }
    }

    /// Number of heights in the window; zero when `end < start`.
    pub fn blocks(&self) -> i64 {
        (self.end - self.start + 1).max(0)
    }

    pub fn heights(&self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }
}

/// Derived vote statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TallyStats {
    pub votes_cast: u64,
    pub eligible_votes: u64,
    pub quorum_required: u64,
    pub quorum_achieved: bool,
    pub approval_rate: f64,
    pub turnout_rate: f64,
}

impl TallyStats {
    pub fn compute(yes: u64, no: u64, window: &VotingWindow, votes_per_block: u64) -> Self {
        let votes_cast = yes + no;
        let eligible_votes = window.blocks() as u64 * votes_per_block;
        let quorum_required = eligible_votes / QUORUM_DIVISOR;

        Self {
            votes_cast,
            eligible_votes,
            quorum_required,
            quorum_achieved: votes_cast >= quorum_required,
            approval_rate: percent(yes, votes_cast),
            turnout_rate: percent(votes_cast, eligible_votes),
        }
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_window_spans_voting_interval() {
        let window = VotingWindow::confirmed(560_000, &TreasuryParams::default());
        assert_eq!(window.start, 557_120);
        assert_eq!(window.end, 560_000);
        assert_eq!(window.blocks(), 2881);
        assert!(window.complete);
    }

    #[test]
    fn confirmed_window_clamps_to_activation() {
        let window = VotingWindow::confirmed(553_000, &TreasuryParams::default());
        assert_eq!(window.start, 552_448);
        assert_eq!(window.blocks(), 553);
    }

    #[test]
    fn mempool_window_runs_to_expiry() {
        let window = VotingWindow::mempool(600_000, 600_100, &TreasuryParams::default());
        // 600_100 - 597_120 = 2980, inside the span.
        assert_eq!(window.start, 597_120);
        assert_eq!(window.end, 600_100);
        assert!(!window.complete);
    }

    #[test]
    fn wide_mempool_window_keeps_recent_blocks() {
        let window = VotingWindow::mempool(600_000, 600_500, &TreasuryParams::default());
        assert_eq!(window.start, 597_500);
        assert_eq!(window.end - window.start, 3000);
    }

    #[test]
    fn mempool_window_floor_is_zero() {
        let window = VotingWindow::mempool(100, 200, &TreasuryParams::default());
        assert_eq!(window.start, 0);
    }

    #[test]
    fn inverted_window_is_empty() {
        let window = VotingWindow {
            start: 10,
            end: 5,
            complete: false,
        };
        assert_eq!(window.blocks(), 0);
        assert_eq!(window.heights().count(), 0);
    }

    #[test]
    fn stats_for_a_full_window() {
        let window = VotingWindow::confirmed(560_000, &TreasuryParams::default());
        let stats = TallyStats::compute(1000, 500, &window, 5);
        assert_eq!(stats.votes_cast, 1500);
        assert_eq!(stats.eligible_votes, 14_405);
        assert_eq!(stats.quorum_required, 2881);
        assert!(!stats.quorum_achieved);
        assert!((stats.approval_rate - 66.666_666).abs() < 1e-3);
        assert!((stats.turnout_rate - 10.413_050).abs() < 1e-3);
    }

    #[test]
    fn stats_without_votes_are_zero() {
        let window = VotingWindow::confirmed(560_000, &TreasuryParams::default());
        let stats = TallyStats::compute(0, 0, &window, 5);
        assert_eq!(stats.approval_rate, 0.0);
        assert_eq!(stats.turnout_rate, 0.0);
        assert!(!stats.quorum_achieved);
    }

    #[test]
    fn quorum_is_inclusive() {
        let window = VotingWindow {
            start: 1,
            end: 10,
            complete: true,
        };
        // 50 eligible, 10 required.
        assert!(TallyStats::compute(6, 4, &window, 5).quorum_achieved);
        assert!(!TallyStats::compute(6, 3, &window, 5).quorum_achieved);
    }
}
