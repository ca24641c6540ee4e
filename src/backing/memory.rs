//! In-memory jar
//!
//! Implements both capability shapes over one map and records every
//! physical write, so tests can assert exactly what an adapter emitted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::codec::Chunk;
use crate::config::CookieOptions;
use crate::error::{ChunkJarError, Result};

use super::{BatchEntry, BatchOp, BatchSink, BatchSource, ChunkRemover, ChunkSetter, ChunkSource};

/// Shared in-memory backing store
#[derive(Debug, Default)]
pub struct MemoryJar {
    /// Current physical entries, ordered by name
    entries: Mutex<BTreeMap<String, String>>,

    /// Every write applied since creation (or the last `clear_writes`)
    writes: Mutex<Vec<BatchEntry>>,

    /// Number of `set_all` calls
    batch_calls: AtomicUsize,

    /// When set, every write fails with a backing error
    failing: AtomicBool,

    /// When set, every read fails with a backing error
    failing_reads: AtomicBool,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a physical entry without recording it as a write
    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().insert(name.into(), value.into());
    }

    /// Seed a list of chunks without recording them as writes
    pub fn insert_chunks(&self, chunks: impl IntoIterator<Item = Chunk>) {
        let mut entries = self.entries.lock();
        for chunk in chunks {
            entries.insert(chunk.name, chunk.value);
        }
    }

    /// Physical entries in name order
    pub fn chunks(&self) -> Vec<Chunk> {
        self.entries
            .lock()
            .iter()
            .map(|(name, value)| Chunk::new(name.clone(), value.clone()))
            .collect()
    }

    /// Physical entry names in order
    pub fn names(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.entries.lock().get(name).cloned()
    }

    /// Recorded writes in application order
    pub fn writes(&self) -> Vec<BatchEntry> {
        self.writes.lock().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every subsequent read fail
    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    fn check_readable(&self) -> Result<()> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(ChunkJarError::Backing("memory jar read rejected".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChunkJarError::Backing("memory jar write rejected".to_string()));
        }
        Ok(())
    }

    /// Apply one entry; called with the entries lock held
    fn apply(entries: &mut BTreeMap<String, String>, entry: &BatchEntry) {
        let expired = entry.options.max_age == Some(0);
        match entry.op {
            BatchOp::Set if !expired => {
                entries.insert(entry.name.clone(), entry.value.clone());
            }
            _ => {
                entries.remove(&entry.name);
            }
        }
    }
}

#[async_trait]
impl ChunkSource for MemoryJar {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        self.check_readable()?;
        Ok(self.value(name))
    }
}

#[async_trait]
impl ChunkSetter for MemoryJar {
    async fn set(&self, name: &str, value: &str, options: &CookieOptions) -> Result<()> {
        self.check_writable()?;
        let entry = BatchEntry::set(Chunk::new(name, value), options.clone());
        Self::apply(&mut self.entries.lock(), &entry);
        self.writes.lock().push(entry);
        Ok(())
    }
}

#[async_trait]
impl ChunkRemover for MemoryJar {
    async fn remove(&self, name: &str, options: &CookieOptions) -> Result<()> {
        self.check_writable()?;
        let entry = BatchEntry::remove(name, options.clone());
        Self::apply(&mut self.entries.lock(), &entry);
        self.writes.lock().push(entry);
        Ok(())
    }
}

#[async_trait]
impl BatchSource for MemoryJar {
    async fn get_all(&self) -> Result<Option<Vec<Chunk>>> {
        self.check_readable()?;
        Ok(Some(self.chunks()))
    }
}

#[async_trait]
impl BatchSink for MemoryJar {
    async fn set_all(&self, entries: Vec<BatchEntry>) -> Result<()> {
        self.check_writable()?;
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut current = self.entries.lock();
            for entry in &entries {
                Self::apply(&mut current, entry);
            }
        }

        self.writes.lock().extend(entries);
        Ok(())
    }
}
