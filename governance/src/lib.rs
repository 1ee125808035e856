//! Treasury governance classifiers.
//!
//! Pure functions over [`pulse_ledger::TxRecord`]: which transactions are
//! treasury spends, which are votes, and what a vote says about a given
//! spend. Nothing here fails; malformed or foreign data classifies as
//! "no match" or [`VoteChoice::Unknown`].

pub mod detector;
pub mod extract;
pub mod vote_bits;

pub use detector::{is_treasury_spend, is_vote_transaction};
pub use extract::{history_record, spend_record};
pub use vote_bits::{decode_vote_bits, encode_vote_bits, find_vote, VoteChoice};
