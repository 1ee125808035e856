//! Finished tallies for confirmed treasury spends.
//!
//! A bounded FIFO map: when full, the oldest entry is evicted to make room.
//! An entry is written once and never replaced; recomputing an evicted
//! spend produces a fresh entry.

use std::collections::{HashMap, VecDeque};

use pulse_types::{TxHash, VotingTally};

/// Outcome of [`TallyCache::insert`].
#[derive(Debug, PartialEq, Eq)]
pub enum CacheInsert {
    Stored { evicted: Option<TxHash> },
    /// The spend already had a result; it was left untouched.
    AlreadyPresent,
}

pub struct TallyCache {
    entries: HashMap<TxHash, VotingTally>,
    order: VecDeque<TxHash>,
    capacity: usize,
}

impl TallyCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, hash: &TxHash) -> Option<&VotingTally> {
        self.entries.get(hash)
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.entries.contains_key(hash)
    }

    /// Store `tally` unless `hash` already has one, evicting the oldest
    /// entry if at capacity.
    pub fn insert(&mut self, hash: TxHash, tally: VotingTally) -> CacheInsert {
        if self.entries.contains_key(&hash) {
            return CacheInsert::AlreadyPresent;
        }
        let mut evicted = None;
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }
        self.entries.insert(hash, tally);
        self.order.push_back(hash);
        CacheInsert::Stored { evicted }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    fn tally(yes: u64) -> VotingTally {
        VotingTally {
            yes_votes: yes,
            voting_complete: true,
            ..VotingTally::default()
        }
    }

    #[test]
    fn insert_and_get() {
        let mut cache = TallyCache::new(4);
        assert!(cache.get(&make_hash(1)).is_none());
        assert_eq!(
            cache.insert(make_hash(1), tally(7)),
            CacheInsert::Stored { evicted: None }
        );
        assert_eq!(cache.get(&make_hash(1)).map(|t| t.yes_votes), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn existing_entry_is_never_replaced() {
        let mut cache = TallyCache::new(4);
        cache.insert(make_hash(1), tally(7));
        assert_eq!(cache.insert(make_hash(1), tally(99)), CacheInsert::AlreadyPresent);
        assert_eq!(cache.get(&make_hash(1)).map(|t| t.yes_votes), Some(7));
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut cache = TallyCache::new(2);
        cache.insert(make_hash(1), tally(1));
        cache.insert(make_hash(2), tally(2));
        assert_eq!(
            cache.insert(make_hash(3), tally(3)),
            CacheInsert::Stored { evicted: Some(make_hash(1)) }
        );
        assert!(!cache.contains(&make_hash(1)));
        assert!(cache.contains(&make_hash(2)));
        assert!(cache.contains(&make_hash(3)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let mut cache = TallyCache::new(0);
        cache.insert(make_hash(1), tally(1));
        assert!(cache.contains(&make_hash(1)));
        assert!(!cache.is_empty());
    }
}
