//! Overlay implementation
//!
//! BTreeMap-based pending state owned by a single adapter.

use std::collections::BTreeMap;

use super::OverlayEntry;

/// Pending sets and removals for one unit of work
#[derive(Debug, Default, Clone)]
pub struct Overlay {
    entries: BTreeMap<String, OverlayEntry>,
}

impl Overlay {
    /// Create a new empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending state for a key, if any
    pub fn get(&self, key: &str) -> Option<&OverlayEntry> {
        self.entries.get(key)
    }

    /// Record a pending value, replacing any removal marker
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), OverlayEntry::Value(value.into()));
    }

    /// Record a pending removal, dropping any pending value
    pub fn remove(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), OverlayEntry::Removed);
    }

    /// Keys with a pending value, in key order
    pub fn pending_sets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(key, entry)| match entry {
            OverlayEntry::Value(value) => Some((key.as_str(), value.as_str())),
            OverlayEntry::Removed => None,
        })
    }

    /// Keys pending removal, in key order
    pub fn pending_removals(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(key, entry)| match entry {
            OverlayEntry::Removed => Some(key.as_str()),
            OverlayEntry::Value(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
