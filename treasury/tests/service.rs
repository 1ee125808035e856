mod common;

use std::sync::Arc;

use pulse_nullables::{fixtures, NullLedger};
use pulse_treasury::{TreasuryConfig, TreasuryError, TreasuryService};
use pulse_types::Amount;

use common::{service_over, test_params};

fn ledger_with_pending_spend() -> Arc<NullLedger> {
    let ledger = Arc::new(NullLedger::new());
    ledger.set_tip(1_500);
    ledger.add_mempool_tx(fixtures::treasury_spend(
        fixtures::tx_id(1),
        1_600,
        &[(250.0, "DsGrantee")],
    ));
    ledger.add_mempool_tx(fixtures::regular_tx(fixtures::tx_id(2)));
    ledger
}

#[tokio::test]
async fn treasury_info_combines_balance_and_mempool() {
    let ledger = ledger_with_pending_spend();
    ledger.set_treasury_balance(Amount::from_coins(812_345.5));
    let service = service_over(&ledger);

    let info = service.fetch_treasury_info().await.unwrap();
    assert_eq!(info.balance.to_coins(), 812_345.5);
    assert_eq!(info.active_spends.len(), 1);
    assert_eq!(info.active_spends[0].payee, "DsGrantee");
    assert_eq!(info.active_spends[0].blocks_remaining, 100);
    assert!(info.last_update.as_secs() > 0);
}

#[tokio::test]
async fn treasury_info_reports_zero_balance_on_failure() {
    let ledger = ledger_with_pending_spend();
    let service = service_over(&ledger);

    let info = service.fetch_treasury_info().await.unwrap();
    assert!(info.balance.is_zero());
    assert_eq!(info.active_spends.len(), 1);
    assert_eq!(service.metrics().fetch_failures.get(), 1);
}

#[tokio::test]
async fn probe_lists_pending_spends() {
    let ledger = ledger_with_pending_spend();
    let service = service_over(&ledger);

    let spends = service.probe_mempool().await.unwrap();
    assert_eq!(spends.len(), 1);
    assert_eq!(spends[0].tx_hash, fixtures::tx_id(1));
    assert_eq!(spends[0].current_height, 1_500);

    ledger.fail_mempool(true);
    assert!(service.probe_mempool().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_source_fails_every_ledger_operation() {
    let service = TreasuryService::new(None, test_params(), 8);
    assert!(matches!(
        service.probe_mempool().await,
        Err(TreasuryError::SourceUnavailable)
    ));
    assert!(matches!(
        service.fetch_treasury_info().await,
        Err(TreasuryError::SourceUnavailable)
    ));
    assert!(matches!(
        service.count_votes_in_range(&fixtures::tx_id(1), 1, 2).await,
        Err(TreasuryError::SourceUnavailable)
    ));
}

#[tokio::test]
async fn service_builds_from_config() {
    let config = TreasuryConfig::from_toml_str(
        r#"
            tally_cache_capacity = 2

            [params]
            activation_height = 10
            voting_interval = 5
        "#,
    )
    .unwrap();
    let ledger = Arc::new(NullLedger::new());
    ledger.extend_chain(10, 20);
    let source: Arc<dyn pulse_ledger::LedgerSource> = ledger;
    let service = TreasuryService::from_config(Some(source), &config);

    let placeholder = service
        .get_tally(fixtures::tx_id(3), 20, 0, false)
        .await
        .unwrap();
    assert_eq!(placeholder.voting_start_block, 15);
    assert_eq!(placeholder.voting_end_block, 20);
}
