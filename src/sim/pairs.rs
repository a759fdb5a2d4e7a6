//! Pair registry: tracks which locked capsules still have both halves linked

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping pair id -> live fragment count, plus the id mint
///
/// Ids start at 1 and are never reused within a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRegistry {
    counts: BTreeMap<u32, u8>,
    next_id: u32,
}

impl Default for PairRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PairRegistry {
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a fresh pair id
    pub fn mint(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record (or restore) a linked pair
    pub fn link(&mut self, pair_id: u32, count: u8) {
        self.counts.insert(pair_id, count);
    }

    pub fn unlink(&mut self, pair_id: u32) {
        self.counts.remove(&pair_id);
    }

    pub fn count(&self, pair_id: u32) -> Option<u8> {
        self.counts.get(&pair_id).copied()
    }

    pub fn contains(&self, pair_id: u32) -> bool {
        self.counts.contains_key(&pair_id)
    }

    /// Drop one fragment from a pair and return what is left of it.
    /// Reaching 0 or 1 removes the entry; the caller unpairs any survivor.
    pub fn release_one(&mut self, pair_id: u32) -> u8 {
        let remaining = self.count(pair_id).unwrap_or(0).saturating_sub(1);
        if remaining <= 1 {
            self.counts.remove(&pair_id);
        } else {
            self.counts.insert(pair_id, remaining);
        }
        remaining
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.keys().copied()
    }
}
