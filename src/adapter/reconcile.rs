//! Reconciliation
//!
//! Diffs pending overlay state against the backing store's actual chunk
//! layout and produces the minimal batch that makes them agree.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::backing::{BatchEntry, Snapshot};
use crate::codec::{create_chunks, Chunk, ChunkName};
use crate::config::Config;
use crate::overlay::Overlay;

/// Physical changes needed to apply an overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Existing chunk names to delete
    pub to_remove: BTreeSet<String>,

    /// Chunks to write, in key then index order
    pub to_set: Vec<Chunk>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_set.is_empty()
    }

    /// Lay out the batch: every removal first, then every set, so a name
    /// present in both ends up in its set state.
    pub fn into_batch(self, config: &Config) -> Vec<BatchEntry> {
        let remove_options = config.remove_options();
        let set_options = config.set_options();

        let mut batch = Vec::with_capacity(self.to_remove.len() + self.to_set.len());
        batch.extend(
            self.to_remove
                .into_iter()
                .map(|name| BatchEntry::remove(name, remove_options.clone())),
        );
        batch.extend(
            self.to_set
                .into_iter()
                .map(|chunk| BatchEntry::set(chunk, set_options.clone())),
        );
        batch
    }
}

/// Compute the removals and sets that take `existing` to the state
/// described by `overlay`. Chunks of keys absent from the overlay are
/// never touched.
pub fn reconcile(existing: &Snapshot, overlay: &Overlay, max_chunk_size: usize) -> Reconciliation {
    let removed: HashSet<&str> = overlay.pending_removals().collect();
    let mut to_remove: BTreeSet<String> = BTreeSet::new();

    // Whole families of removed keys
    for name in existing.names() {
        let parsed = ChunkName::parse(name);
        if removed.contains(name) || (parsed.index.is_some() && removed.contains(parsed.base)) {
            to_remove.insert(name.to_string());
        }
    }

    // New layouts, plus stale leftovers of keys whose value shrank
    let mut layouts: Vec<Vec<Chunk>> = Vec::new();
    for (key, value) in overlay.pending_sets() {
        let chunks = create_chunks(key, value, max_chunk_size);
        let fresh: HashSet<&str> = chunks.iter().map(|c| c.name.as_str()).collect();

        for name in existing.names() {
            if ChunkName::belongs_to(name, key) && !fresh.contains(name) {
                to_remove.insert(name.to_string());
            }
        }

        layouts.push(chunks);
    }

    // Skip chunks the store already holds verbatim, unless a removal above
    // would otherwise delete them
    let to_set: Vec<Chunk> = layouts
        .into_iter()
        .flatten()
        .filter(|chunk| {
            to_remove.contains(&chunk.name)
                || existing.get(&chunk.name) != Some(chunk.value.as_str())
        })
        .collect();

    debug!(
        existing = existing.len(),
        remove = to_remove.len(),
        set = to_set.len(),
        "Reconciled overlay"
    );

    Reconciliation { to_remove, to_set }
}
