//! Vote tally results and the live progress of a running tally.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Aggregate vote statistics for one treasury spend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VotingTally {
    pub voting_start_block: i64,
    pub voting_end_block: i64,
    pub yes_votes: u64,
    pub no_votes: u64,
    /// Yes plus no; abstentions are not counted.
    pub votes_cast: u64,
    pub eligible_votes: u64,
    pub quorum_required: u64,
    pub quorum_achieved: bool,
    /// `yes / (yes + no) * 100`, or 0 with no votes.
    pub approval_rate: f64,
    /// `votes_cast / eligible_votes * 100`.
    pub turnout_rate: f64,
    pub voting_complete: bool,
    pub in_mempool: bool,
    pub voting_start_time: Option<Timestamp>,
    pub voting_end_time: Option<Timestamp>,
}

impl VotingTally {
    /// Zero-filled tally for a window whose count has not finished.
    pub fn placeholder(start: i64, end: i64, in_mempool: bool) -> Self {
        Self {
            voting_start_block: start,
            voting_end_block: end,
            in_mempool,
            ..Self::default()
        }
    }
}

/// Live progress of a tally job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteTallyProgress {
    pub is_parsing: bool,
    /// Percent of the window processed, within `[0, 100]`.
    pub progress: f64,
    pub current_block: i64,
    pub total_blocks: i64,
    pub yes_votes: u64,
    pub no_votes: u64,
    /// Linear extrapolation of the remaining time.
    pub estimated_secs: u64,
    pub message: String,
}
