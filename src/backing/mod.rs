//! Backing Store Module
//!
//! The external, size-constrained key/value medium being adapted.
//!
//! ## Capability Shapes
//! Exactly one shape is selected at construction through [`Backing`]:
//! - **Incremental**: single-entry `get` / `set` / `remove`
//! - **Bulk**: whole-batch `get_all` / `set_all`
//!
//! Write primitives are optional in both shapes, and in the incremental
//! shape `set` and `remove` are independent. A mutation whose primitive is
//! missing is skipped with a warning instead of failing.

mod file;
mod memory;

pub use file::FileJar;
pub use memory::MemoryJar;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::Chunk;
use crate::config::CookieOptions;
use crate::error::Result;

// =============================================================================
// Incremental Capability
// =============================================================================

/// Single-entry read access
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>>;
}

/// Single-entry write
#[async_trait]
pub trait ChunkSetter: Send + Sync {
    async fn set(&self, name: &str, value: &str, options: &CookieOptions) -> Result<()>;
}

/// Single-entry removal
#[async_trait]
pub trait ChunkRemover: Send + Sync {
    async fn remove(&self, name: &str, options: &CookieOptions) -> Result<()>;
}

// =============================================================================
// Bulk Capability
// =============================================================================

/// Whole-batch read access
#[async_trait]
pub trait BatchSource: Send + Sync {
    /// Every physical entry currently held, or `None` if nothing is available
    async fn get_all(&self) -> Result<Option<Vec<Chunk>>>;
}

/// Whole-batch write access
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Apply all entries in order as one operation
    async fn set_all(&self, entries: Vec<BatchEntry>) -> Result<()>;
}

/// Kind of a batch entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOp {
    Set,
    Remove,
}

/// One physical write inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
    pub op: BatchOp,
}

impl BatchEntry {
    /// A removal entry (empty value)
    pub fn remove(name: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            options,
            op: BatchOp::Remove,
        }
    }

    /// A set entry
    pub fn set(chunk: Chunk, options: CookieOptions) -> Self {
        Self {
            name: chunk.name,
            value: chunk.value,
            options,
            op: BatchOp::Set,
        }
    }
}

// =============================================================================
// Capability Selection
// =============================================================================

/// Backing capability, chosen once when the adapter is built
#[derive(Clone)]
pub enum Backing {
    Incremental {
        source: Arc<dyn ChunkSource>,
        setter: Option<Arc<dyn ChunkSetter>>,
        remover: Option<Arc<dyn ChunkRemover>>,
    },
    Bulk {
        source: Arc<dyn BatchSource>,
        sink: Option<Arc<dyn BatchSink>>,
    },
}

impl Backing {
    /// Incremental backing with full read/write access
    pub fn incremental<S>(store: Arc<S>) -> Self
    where
        S: ChunkSource + ChunkSetter + ChunkRemover + 'static,
    {
        Backing::Incremental {
            source: store.clone(),
            setter: Some(store.clone()),
            remover: Some(store),
        }
    }

    /// Bulk backing with full read/write access
    pub fn bulk<S>(store: Arc<S>) -> Self
    where
        S: BatchSource + BatchSink + 'static,
    {
        Backing::Bulk {
            source: store.clone(),
            sink: Some(store),
        }
    }
}

impl fmt::Debug for Backing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backing::Incremental { setter, remover, .. } => f
                .debug_struct("Incremental")
                .field("settable", &setter.is_some())
                .field("removable", &remover.is_some())
                .finish(),
            Backing::Bulk { sink, .. } => f
                .debug_struct("Bulk")
                .field("writable", &sink.is_some())
                .finish(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of one batch read, keyed by chunk name
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    chunks: HashMap<String, String>,
}

impl Snapshot {
    /// Fetch a fresh snapshot from the backing store
    pub async fn fetch(source: &dyn BatchSource) -> Result<Self> {
        let chunks = source.get_all().await?.unwrap_or_default();
        Ok(Self::from_chunks(chunks))
    }

    /// Build a snapshot from a chunk listing.
    ///
    /// The first occurrence of a duplicate name wins: cookie jars list the
    /// most specific path first.
    pub fn from_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut map = HashMap::new();
        for chunk in chunks {
            map.entry(chunk.name).or_insert(chunk.value);
        }
        Self { chunks: map }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.chunks.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chunks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
