//! Overlay Module
//!
//! In-memory pending-mutation layer shadowing a bulk backing store for one
//! unit of work.
//!
//! ## Responsibilities
//! - Record pending sets and removals without any I/O
//! - Answer reads ahead of the backing store
//! - Hand pending state to reconciliation at flush time
//!
//! ## Data Structure Choice
//! One BTreeMap from key to [`OverlayEntry`]:
//! - A key is either pending-set or pending-removed, never both
//! - Ordered keys give a deterministic flush batch

mod table;

pub use table::Overlay;

/// Pending state of one logical key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEntry {
    /// A pending value
    Value(String),

    /// A pending removal
    Removed,
}
