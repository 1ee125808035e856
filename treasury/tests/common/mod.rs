#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pulse_governance::VoteChoice;
use pulse_ledger::LedgerSource;
use pulse_nullables::{fixtures, NullLedger};
use pulse_treasury::TreasuryService;
use pulse_types::{TreasuryParams, TxHash};

/// Small windows so tests walk a few hundred blocks at most.
pub fn test_params() -> TreasuryParams {
    TreasuryParams {
        activation_height: 1_000,
        voting_interval: 100,
        max_scan_span: 120,
        votes_per_block: 5,
        progress_interval: 10,
    }
}

pub fn service_over(ledger: &Arc<NullLedger>) -> TreasuryService {
    let source: Arc<dyn LedgerSource> = Arc::clone(ledger) as Arc<dyn LedgerSource>;
    TreasuryService::new(Some(source), test_params(), 8)
}

/// Poll `condition` every few milliseconds for up to five seconds.
pub async fn wait_until<F: FnMut() -> bool>(mut condition: F) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 5s");
}

/// Cast `choice` on `target` in the block at `height`, once per `count`.
pub fn cast_votes(ledger: &NullLedger, height: i64, target: &TxHash, choice: VoteChoice, count: u64) {
    for i in 0..count {
        let seed = (height as u64) << 16 | (choice as u64) << 8 | i;
        ledger.add_stake_tx(height, fixtures::vote(fixtures::tx_id(seed), target, choice));
    }
}
