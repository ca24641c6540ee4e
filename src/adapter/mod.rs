//! Adapter Module
//!
//! Chunked key/value storage exposed upward as [`SessionStorage`].
//!
//! ## Variants
//! - [`IncrementalAdapter`]: writes straight through single-entry calls
//! - [`BufferedAdapter`]: buffers in an overlay, writes one batch per flush
//!
//! [`Storage`] picks the variant from the [`Backing`] it is given; the
//! choice is made once and never re-inferred.

mod buffered;
mod incremental;
mod reconcile;

pub use buffered::BufferedAdapter;
pub use incremental::IncrementalAdapter;
pub use reconcile::{reconcile, Reconciliation};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backing::Backing;
use crate::config::Config;
use crate::error::Result;

/// Lifecycle event that makes the caller flush pending writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushTrigger {
    Refreshed,
    Updated,
    SignedOut,
}

/// Outcome of one flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub trigger: FlushTrigger,

    /// Removal entries emitted
    pub removed: usize,

    /// Set entries emitted
    pub written: usize,
}

impl FlushReport {
    pub fn empty(trigger: FlushTrigger) -> Self {
        Self {
            trigger,
            removed: 0,
            written: 0,
        }
    }

    /// Total physical writes emitted
    pub fn operations(&self) -> usize {
        self.removed + self.written
    }
}

/// Key/value storage contract consumed by an auth client
#[async_trait]
pub trait SessionStorage: Send {
    async fn get_item(&mut self, key: &str) -> Result<Option<String>>;

    async fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    async fn remove_item(&mut self, key: &str) -> Result<()>;

    /// Persist pending writes. Called by the owner at lifecycle points,
    /// never implicitly by `set_item`.
    async fn flush(&mut self, trigger: FlushTrigger) -> Result<FlushReport>;

    /// Values come from a server environment and must not be trusted as
    /// proof of authentication on their own.
    fn is_server(&self) -> bool {
        true
    }
}

/// Adapter selected from the backing capability
pub enum Storage {
    Incremental(IncrementalAdapter),
    Buffered(BufferedAdapter),
}

impl Storage {
    /// Build the adapter matching `backing`
    pub fn new(config: Config, backing: Backing) -> Result<Self> {
        match backing {
            Backing::Incremental {
                source,
                setter,
                remover,
            } => IncrementalAdapter::new(config, source, setter, remover).map(Storage::Incremental),
            Backing::Bulk { source, sink } => {
                BufferedAdapter::new(config, source, sink).map(Storage::Buffered)
            }
        }
    }

    pub fn config(&self) -> &Config {
        match self {
            Storage::Incremental(adapter) => adapter.config(),
            Storage::Buffered(adapter) => adapter.config(),
        }
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self, Storage::Buffered(_))
    }
}

#[async_trait]
impl SessionStorage for Storage {
    async fn get_item(&mut self, key: &str) -> Result<Option<String>> {
        match self {
            Storage::Incremental(adapter) => adapter.get_item(key).await,
            Storage::Buffered(adapter) => adapter.get_item(key).await,
        }
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            Storage::Incremental(adapter) => adapter.set_item(key, value).await,
            Storage::Buffered(adapter) => adapter.set_item(key, value).await,
        }
    }

    async fn remove_item(&mut self, key: &str) -> Result<()> {
        match self {
            Storage::Incremental(adapter) => adapter.remove_item(key).await,
            Storage::Buffered(adapter) => adapter.remove_item(key).await,
        }
    }

    async fn flush(&mut self, trigger: FlushTrigger) -> Result<FlushReport> {
        match self {
            Storage::Incremental(adapter) => adapter.flush(trigger).await,
            Storage::Buffered(adapter) => adapter.flush(trigger).await,
        }
    }
}
