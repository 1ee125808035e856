//! Ledger data source interface.
//!
//! The scanner and the tally engine never talk to a node directly; they
//! consume the [`LedgerSource`] capability. Records returned by a source are
//! structural: every field the node may omit is optional, and an absent
//! field is simply "not present" to the classifiers built on top.

pub mod block;
pub mod error;
pub mod source;
pub mod transaction;

pub use block::BlockInfo;
pub use error::LedgerError;
pub use source::LedgerSource;
pub use transaction::{ScriptPubKey, TxInput, TxOutput, TxRecord};
