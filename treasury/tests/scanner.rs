mod common;

use std::sync::Arc;

use pulse_nullables::{block_hash_for, fixtures, NullLedger};
use pulse_treasury::{TreasuryError, TreasuryService};

use common::{service_over, test_params, wait_until};

fn chain_with_spends() -> Arc<NullLedger> {
    let ledger = Arc::new(NullLedger::new());
    ledger.extend_chain(1_000, 1_040);
    ledger.add_regular_tx(1_005, fixtures::regular_tx(fixtures::tx_id(1)));
    ledger.add_regular_tx(
        1_010,
        fixtures::treasury_spend(fixtures::tx_id(2), 1_020, &[(100.0, "DsPayeeA")]),
    );
    ledger.add_stake_tx(
        1_030,
        fixtures::minimal_treasury_spend(fixtures::tx_id(3), 1_040, &[(7.5, "DsPayeeB")]),
    );
    ledger
}

#[tokio::test]
async fn scan_finds_spends_in_both_trees() {
    let ledger = chain_with_spends();
    let service = service_over(&ledger);

    service.trigger_historical_scan(0).unwrap();
    service.wait_for_scan().await;

    let results = service.scan_results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tx_hash, fixtures::tx_id(2));
    assert_eq!(results[0].block_height, 1_010);
    assert_eq!(results[0].block_hash, block_hash_for(1_010));
    assert_eq!(results[0].amount.to_coins(), 100.0);
    assert_eq!(results[0].payee, "DsPayeeA");
    assert_eq!(results[0].vote_result, "approved");
    assert_eq!(results[1].tx_hash, fixtures::tx_id(3));

    let progress = service.scan_progress();
    assert!(!progress.is_scanning);
    assert_eq!(progress.current_height, 1_040);
    assert_eq!(progress.total_height, 1_040);
    assert_eq!(progress.progress, 100.0);
    assert_eq!(progress.found, 2);
    assert_eq!(progress.message, "Scan complete. Found 2 treasury spends");
    assert_eq!(service.metrics().scan_blocks.get(), 41);
}

#[tokio::test]
async fn new_spends_are_handed_over_once() {
    let ledger = chain_with_spends();
    let service = service_over(&ledger);

    service.trigger_historical_scan(1_000).unwrap();
    service.wait_for_scan().await;

    let first = service.scan_progress();
    assert_eq!(first.new_spends.len(), 2);
    let second = service.scan_progress();
    assert!(second.new_spends.is_empty());
    assert_eq!(second.found, 2);
}

#[tokio::test]
async fn second_trigger_while_running_is_rejected() {
    let ledger = chain_with_spends();
    let service = service_over(&ledger);
    ledger.hold();

    service.trigger_historical_scan(1_000).unwrap();
    let progress = service.scan_progress();
    assert!(progress.is_scanning);
    assert_eq!(progress.progress, 0.0);
    assert_eq!(progress.message, "Scanning blockchain for treasury spends...");

    assert!(matches!(
        service.trigger_historical_scan(1_000),
        Err(TreasuryError::ScanInProgress)
    ));

    ledger.release();
    service.wait_for_scan().await;
    assert!(!service.scan_progress().is_scanning);
    assert_eq!(service.scan_results().len(), 2);
}

#[tokio::test]
async fn tip_failure_returns_to_idle() {
    let ledger = chain_with_spends();
    ledger.fail_tip(true);
    let service = service_over(&ledger);

    service.trigger_historical_scan(1_000).unwrap();
    service.wait_for_scan().await;

    let progress = service.scan_progress();
    assert!(!progress.is_scanning);
    assert_eq!(progress.found, 0);
    assert_eq!(progress.message, "No scan in progress");

    ledger.fail_tip(false);
    service.trigger_historical_scan(1_000).unwrap();
    service.wait_for_scan().await;
    assert_eq!(service.scan_results().len(), 2);
}

#[tokio::test]
async fn unreadable_blocks_and_transactions_are_skipped() {
    let ledger = chain_with_spends();
    ledger.fail_height(1_010);
    ledger.fail_tx(fixtures::tx_id(1));
    let service = service_over(&ledger);

    service.trigger_historical_scan(1_000).unwrap();
    service.wait_for_scan().await;

    let results = service.scan_results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].tx_hash, fixtures::tx_id(3));
    assert_eq!(service.scan_progress().current_height, 1_040);
}

#[tokio::test]
async fn rescan_replaces_previous_results() {
    let ledger = chain_with_spends();
    let service = service_over(&ledger);

    service.trigger_historical_scan(1_000).unwrap();
    service.wait_for_scan().await;
    assert_eq!(service.scan_results().len(), 2);

    service.trigger_historical_scan(1_020).unwrap();
    service.wait_for_scan().await;
    let results = service.scan_results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].block_height, 1_030);
}

#[tokio::test]
async fn start_below_activation_is_clamped() {
    let ledger = chain_with_spends();
    let service = service_over(&ledger);

    service.trigger_historical_scan(-50).unwrap();
    assert_eq!(service.scan_progress().current_height, test_params().activation_height);
    service.wait_for_scan().await;
    assert_eq!(service.scan_results().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn progress_only_moves_forward() {
    let ledger = Arc::new(NullLedger::new());
    ledger.extend_chain(1_000, 1_400);
    let service = service_over(&ledger);

    service.trigger_historical_scan(1_000).unwrap();
    let mut last = 0.0;
    let mut last_height = 0;
    wait_until(|| {
        let progress = service.scan_progress();
        assert!(progress.progress >= last);
        assert!(progress.current_height >= last_height);
        last = progress.progress;
        last_height = progress.current_height;
        !progress.is_scanning
    })
    .await;
    assert_eq!(last, 100.0);
}

#[tokio::test]
async fn shutdown_stops_the_scan() {
    let ledger = chain_with_spends();
    let service = service_over(&ledger);
    ledger.hold();

    service.trigger_historical_scan(1_000).unwrap();
    service.shutdown();
    ledger.release();
    service.wait_for_scan().await;

    let progress = service.scan_progress();
    assert!(!progress.is_scanning);
    assert!(progress.current_height <= 1_000);
}

#[tokio::test]
async fn missing_source_is_a_hard_failure() {
    let service = TreasuryService::new(None, test_params(), 8);
    assert!(matches!(
        service.trigger_historical_scan(1_000),
        Err(TreasuryError::SourceUnavailable)
    ));
    assert!(!service.scan_progress().is_scanning);
}
