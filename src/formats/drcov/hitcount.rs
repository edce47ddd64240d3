//! Per-module block hit counts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::formats::drcov::types::BasicBlock;

/// How many times each `(mod_id, offset)` pair appears in the block table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCountMap {
    counts: BTreeMap<u16, BTreeMap<u32, usize>>,
}

impl HitCountMap {
    pub fn from_blocks(blocks: &[BasicBlock]) -> Self {
        let mut counts: BTreeMap<u16, BTreeMap<u32, usize>> = BTreeMap::new();
        for bb in blocks {
            *counts
                .entry(bb.mod_id)
                .or_default()
                .entry(bb.offset)
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, mod_id: u16, offset: u32) -> usize {
        self.counts
            .get(&mod_id)
            .and_then(|offsets| offsets.get(&offset))
            .copied()
            .unwrap_or(0)
    }

    /// Offset -> count map for one module, if it has any blocks.
    pub fn module(&self, mod_id: u16) -> Option<&BTreeMap<u32, usize>> {
        self.counts.get(&mod_id)
    }

    /// `(offset, count)` pairs for one module in offset order.
    pub fn module_hits(&self, mod_id: u16) -> Vec<(u32, usize)> {
        self.module(mod_id)
            .map(|offsets| offsets.iter().map(|(&o, &c)| (o, c)).collect())
            .unwrap_or_default()
    }

    /// Module ids that have at least one block.
    pub fn module_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.counts.keys().copied()
    }

    /// Number of distinct `(mod_id, offset)` pairs.
    pub fn unique_blocks(&self) -> usize {
        self.counts.values().map(BTreeMap::len).sum()
    }

    /// Sum of all counts; equals the number of blocks aggregated.
    pub fn total_hits(&self) -> usize {
        self.counts.values().flat_map(BTreeMap::values).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<u16, BTreeMap<u32, usize>> {
        &self.counts
    }
}
