//! Running tally jobs, at most one per treasury spend.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use pulse_types::TxHash;

#[derive(Default)]
pub struct JobRegistry {
    running: HashSet<TxHash>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `hash` as running. Returns `false` if a job already owns it.
    pub fn register(&mut self, hash: TxHash) -> bool {
        self.running.insert(hash)
    }

    pub fn deregister(&mut self, hash: &TxHash) -> bool {
        self.running.remove(hash)
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.running.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

/// Deregisters its spend when dropped, however the owning job ends.
pub struct JobGuard {
    registry: Arc<RwLock<JobRegistry>>,
    hash: TxHash,
}

impl JobGuard {
    /// Register `hash` and return a guard for it, or `None` if it was
    /// already registered.
    pub fn acquire(registry: &Arc<RwLock<JobRegistry>>, hash: TxHash) -> Option<Self> {
        if !crate::write(registry).register(hash) {
            return None;
        }
        Some(Self {
            registry: Arc::clone(registry),
            hash,
        })
    }

    pub fn hash(&self) -> &TxHash {
        &self.hash
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        crate::write(&self.registry).deregister(&self.hash);
    }
}
