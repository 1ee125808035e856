//! Block summaries returned by the ledger source.

use serde::{Deserialize, Serialize};

use pulse_types::{BlockHash, Timestamp, TxHash};

/// A block with its regular and stake transaction id lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: i64,
    pub hash: BlockHash,
    #[serde(default)]
    pub time: Timestamp,
    #[serde(default, rename = "tx")]
    pub regular_tx_ids: Vec<TxHash>,
    #[serde(default, rename = "stx")]
    pub stake_tx_ids: Vec<TxHash>,
}

impl BlockInfo {
    /// Regular transactions followed by stake transactions.
    pub fn all_tx_ids(&self) -> impl Iterator<Item = &TxHash> {
        self.regular_tx_ids.iter().chain(self.stake_tx_ids.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_node_block_and_chains_ids() {
        let json = r#"{
            "hash": "000000000000000011b1e0f2e3b6e5d3c5b5a3a2f2e1d1c1b1a19181716151ab",
            "height": 560000,
            "time": 1623456789,
            "tx": ["1111111111111111111111111111111111111111111111111111111111111111"],
            "stx": ["2222222222222222222222222222222222222222222222222222222222222222"]
        }"#;
        let block: BlockInfo = serde_json::from_str(json).unwrap();
        assert_eq!(block.height, 560_000);
        assert_eq!(block.time.as_secs(), 1_623_456_789);
        let ids: Vec<_> = block.all_tx_ids().collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], &block.stake_tx_ids[0]);
    }
}
