use pulse_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreasuryError {
    #[error("ledger source not available")]
    SourceUnavailable,

    #[error("scan already in progress")]
    ScanInProgress,

    #[error("failed to get current height: {0}")]
    ChainTip(#[source] LedgerError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("config error: {0}")]
    Config(String),
}
