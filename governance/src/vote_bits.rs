//! Treasury vote bits carried in a vote's null-data outputs.
//!
//! Layout, as hex, left to right:
//!
//! | bytes | content                                  |
//! |-------|------------------------------------------|
//! | 1     | `OP_RETURN`                              |
//! | 1     | push length                              |
//! | 2     | vote prefix                              |
//! | 32    | treasury spend hash, reversed byte order |
//! | 1     | vote choice, low two bits                |
//!
//! Decoding tolerates arbitrary third-party script data: anything short,
//! non-hex, or about a different spend is [`VoteChoice::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

use pulse_ledger::TxRecord;
use pulse_types::TxHash;

/// Hex characters of the opcode and push length.
const HEADER_HEX_LEN: usize = 4;
/// Hex characters of the vote prefix.
const PREFIX_HEX_LEN: usize = 4;
/// Hex characters of the embedded spend hash.
const HASH_HEX_LEN: usize = 64;
/// Hex characters of the vote byte.
const VOTE_HEX_LEN: usize = 2;

const OP_RETURN: u8 = 0x6a;
/// Prefix the wallet writes in front of treasury votes.
const VOTE_PREFIX: [u8; 2] = *b"TV";
/// Script class of data-carrying outputs.
const NULL_DATA: &str = "nulldata";

/// A vote on one treasury spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Abstain,
    Yes,
    No,
    Invalid,
    /// Not a vote on the requested spend, or undecodable.
    Unknown,
}

impl VoteChoice {
    /// Map the low two bits of a vote byte.
    pub fn from_bits(byte: u8) -> Self {
        match byte & 0x03 {
            0x00 => Self::Abstain,
            0x01 => Self::Yes,
            0x02 => Self::No,
            _ => Self::Invalid,
        }
    }

    /// Bit pattern of this choice; `Unknown` has none.
    pub fn bits(&self) -> Option<u8> {
        match self {
            Self::Abstain => Some(0x00),
            Self::Yes => Some(0x01),
            Self::No => Some(0x02),
            Self::Invalid => Some(0x03),
            Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abstain => "abstain",
            Self::Yes => "yes",
            Self::No => "no",
            Self::Invalid => "invalid",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode the vote `script_hex` casts on `target`.
pub fn decode_vote_bits(script_hex: &str, target: &TxHash) -> VoteChoice {
    let raw = script_hex.as_bytes();

    let Some(data) = raw.get(HEADER_HEX_LEN..) else {
        return VoteChoice::Unknown;
    };
    let Some(body) = data.get(PREFIX_HEX_LEN..) else {
        return VoteChoice::Unknown;
    };
    let Some(hash_hex) = body.get(..HASH_HEX_LEN) else {
        return VoteChoice::Unknown;
    };

    let Ok(mut hash) = hex::decode(hash_hex) else {
        return VoteChoice::Unknown;
    };
    hash.reverse();
    if hash.as_slice() != target.as_bytes() {
        return VoteChoice::Unknown;
    }

    let Some(vote_hex) = body.get(HASH_HEX_LEN..HASH_HEX_LEN + VOTE_HEX_LEN) else {
        return VoteChoice::Unknown;
    };
    match hex::decode(vote_hex) {
        Ok(byte) => VoteChoice::from_bits(byte[0]),
        Err(_) => VoteChoice::Unknown,
    }
}

/// Encode a null-data script casting `choice` on `target`.
///
/// Returns `None` for [`VoteChoice::Unknown`], which has no bit pattern.
pub fn encode_vote_bits(target: &TxHash, choice: VoteChoice) -> Option<String> {
    let bits = choice.bits()?;
    let payload_len = (VOTE_PREFIX.len() + 32 + 1) as u8;

    let mut script = Vec::with_capacity(2 + payload_len as usize);
    script.push(OP_RETURN);
    script.push(payload_len);
    script.extend_from_slice(&VOTE_PREFIX);
    script.extend_from_slice(&target.reversed());
    script.push(bits);
    Some(hex::encode(script))
}

/// The vote `tx` casts on `target`, scanning its null-data outputs.
///
/// Votes always carry at least the block reference and vote bits outputs,
/// so anything with fewer than two outputs is not inspected.
pub fn find_vote(tx: &TxRecord, target: &TxHash) -> VoteChoice {
    if tx.vout.len() < 2 {
        return VoteChoice::Unknown;
    }

    tx.vout
        .iter()
        .filter(|output| output.script_kind() == Some(NULL_DATA))
        .filter_map(|output| output.script_hex())
        .filter(|script| !script.is_empty())
        .map(|script| decode_vote_bits(script, target))
        .find(|choice| *choice != VoteChoice::Unknown)
        .unwrap_or(VoteChoice::Unknown)
}
