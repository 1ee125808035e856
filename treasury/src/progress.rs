//! Latest published progress per treasury spend.

use std::collections::HashMap;

use pulse_types::{TxHash, VoteTallyProgress};

#[derive(Default)]
pub struct ProgressBoard {
    records: HashMap<TxHash, VoteTallyProgress>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for `hash`.
    pub fn publish(&mut self, hash: TxHash, progress: VoteTallyProgress) {
        self.records.insert(hash, progress);
    }

    pub fn get(&self, hash: &TxHash) -> Option<&VoteTallyProgress> {
        self.records.get(hash)
    }

    pub fn remove(&mut self, hash: &TxHash) -> Option<VoteTallyProgress> {
        self.records.remove(hash)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
