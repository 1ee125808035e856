//! One-shot probe of the mempool for pending treasury spends.

use tracing::{debug, info, warn};

use pulse_governance::{is_treasury_spend, spend_record};
use pulse_ledger::LedgerSource;
use pulse_types::{SpendRecord, Timestamp};

use crate::TreasuryMetrics;

/// Every treasury spend currently in the mempool.
///
/// Never fails: an unreadable mempool yields no spends, an unknown chain tip
/// is reported as height 0, and transactions that cannot be fetched are
/// skipped.
pub async fn probe_mempool(source: &dyn LedgerSource, metrics: &TreasuryMetrics) -> Vec<SpendRecord> {
    metrics.mempool_probes.inc();

    let ids = match source.mempool_tx_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            metrics.fetch_failures.inc();
            warn!(error = %e, "failed to list mempool");
            return Vec::new();
        }
    };

    let current_height = match source.current_height().await {
        Ok(height) => height,
        Err(e) => {
            metrics.fetch_failures.inc();
            warn!(error = %e, "failed to get current height; reporting spends against height 0");
            0
        }
    };

    let mut spends = Vec::new();
    for txid in &ids {
        let tx = match source.transaction_by_hash(txid).await {
            Ok(tx) => tx,
            Err(e) => {
                metrics.fetch_failures.inc();
                debug!(%txid, error = %e, "skipping unreadable mempool transaction");
                continue;
            }
        };
        if is_treasury_spend(&tx) {
            let record = spend_record(&tx, current_height, Timestamp::now());
            info!(
                txid = %record.tx_hash,
                amount = %record.amount,
                expiry = record.expiry_height,
                "treasury spend in mempool"
            );
            spends.push(record);
        }
    }

    debug!(checked = ids.len(), found = spends.len(), "mempool probe finished");
    spends
}
