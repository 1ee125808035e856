//! Transaction classifiers.

use pulse_ledger::TxRecord;

/// Script class substring carried by treasury spend payouts.
const TREASURY_GEN_MARKER: &str = "treasurygen";

/// Transaction version treasury spends are serialized with.
const TREASURY_SPEND_VERSION: u32 = 3;

/// Whether `tx` is a treasury spend (not a treasurybase).
///
/// The `treasuryspend` input marker is authoritative: such inputs reference
/// no previous output. Views that omit it (minimal mempool entries) fall back
/// to a version-3 transaction paying a `treasurygen-*` script.
pub fn is_treasury_spend(tx: &TxRecord) -> bool {
    if tx.vin.iter().any(|input| input.treasury_spend.is_some()) {
        return true;
    }

    tx.version == Some(TREASURY_SPEND_VERSION)
        && tx.vout.iter().any(|output| {
            output
                .script_kind()
                .is_some_and(|kind| kind.to_ascii_lowercase().contains(TREASURY_GEN_MARKER))
        })
}

/// Whether `tx` is a vote (its first input is a stakebase).
pub fn is_vote_transaction(tx: &TxRecord) -> bool {
    tx.vin
        .first()
        .is_some_and(|input| input.stakebase.is_some())
}
