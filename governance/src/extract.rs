//! Build spend records from classified transactions.

use pulse_ledger::{BlockInfo, TxRecord};
use pulse_types::spend::{STATUS_VOTING, VOTE_RESULT_APPROVED};
use pulse_types::{SpendHistoryRecord, SpendRecord, Timestamp};

/// Record for a spend pending in the mempool at chain height `current_height`.
pub fn spend_record(tx: &TxRecord, current_height: i64, detected_at: Timestamp) -> SpendRecord {
    let expiry_height = i64::from(tx.expiry.unwrap_or(0));
    SpendRecord {
        tx_hash: tx.txid,
        amount: tx.total_output(),
        payee: tx.first_payee().unwrap_or_default().to_string(),
        expiry_height,
        current_height,
        blocks_remaining: expiry_height - current_height,
        status: STATUS_VOTING.to_string(),
        detected_at,
    }
}

/// Record for a spend mined in `block`.
///
/// The vote result is always recorded as approved: a mined spend passed its vote.
pub fn history_record(tx: &TxRecord, block: &BlockInfo) -> SpendHistoryRecord {
    SpendHistoryRecord {
        tx_hash: tx.txid,
        amount: tx.total_output(),
        payee: tx.first_payee().unwrap_or_default().to_string(),
        block_height: block.height,
        block_hash: block.hash,
        timestamp: block.time,
        vote_result: VOTE_RESULT_APPROVED.to_string(),
    }
}
