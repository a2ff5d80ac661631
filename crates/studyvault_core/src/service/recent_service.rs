//! Most-recently-opened document list.
//!
//! # Invariants
//! - Ids are unique and ordered most recent first.
//! - The list never exceeds its bound; the oldest entry is evicted.

use crate::model::item::{Item, ItemId};
use crate::service::tree_service::ItemTree;
use std::collections::{HashSet, VecDeque};

/// Default number of remembered documents.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Bounded, deduplicated recency list of item ids.
#[derive(Debug, Clone)]
pub struct RecentTracker {
    entries: VecDeque<ItemId>,
    limit: usize,
}

impl Default for RecentTracker {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RECENT_LIMIT)
    }
}

impl RecentTracker {
    /// Creates a tracker keeping at most `limit` ids (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Moves `id` to the front, evicting the oldest entry past the bound.
    pub fn record_open(&mut self, id: ItemId) {
        self.entries.retain(|existing| *existing != id);
        self.entries.push_front(id);
        self.entries.truncate(self.limit);
    }

    /// Most-recent-first id snapshot.
    pub fn ids(&self) -> Vec<ItemId> {
        self.entries.iter().copied().collect()
    }

    /// Most-recent-first items; ids missing from `tree` are skipped.
    pub fn list(&self, tree: &ItemTree) -> Vec<Item> {
        self.entries
            .iter()
            .filter_map(|id| tree.get(*id).cloned())
            .collect()
    }

    /// Drops the given ids, keeping the order of the rest.
    pub fn forget(&mut self, ids: &HashSet<ItemId>) {
        self.entries.retain(|id| !ids.contains(id));
    }
}
