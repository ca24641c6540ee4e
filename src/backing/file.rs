//! File-backed jar
//!
//! Bulk backing store persisted as one JSON object (`name -> value`).
//! Every `set_all` rewrites the whole file, which mirrors the one-write-per-
//! unit-of-work constraint of a cookie header.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::codec::Chunk;
use crate::error::Result;

use super::{BatchEntry, BatchOp, BatchSink, BatchSource};

/// JSON file acting as a batch-only backing store
#[derive(Debug, Clone)]
pub struct FileJar {
    path: PathBuf,
}

impl FileJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the jar; `None` when the file does not exist yet
    async fn load(&self) -> Result<Option<BTreeMap<String, String>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl BatchSource for FileJar {
    async fn get_all(&self) -> Result<Option<Vec<Chunk>>> {
        Ok(self.load().await?.map(|entries| {
            entries
                .into_iter()
                .map(|(name, value)| Chunk::new(name, value))
                .collect()
        }))
    }
}

#[async_trait]
impl BatchSink for FileJar {
    async fn set_all(&self, entries: Vec<BatchEntry>) -> Result<()> {
        let mut current = self.load().await?.unwrap_or_default();

        for entry in entries {
            debug!(
                "{}",
                entry.options.to_set_cookie(&entry.name, &entry.value)
            );
            match entry.op {
                BatchOp::Set if entry.options.max_age != Some(0) => {
                    current.insert(entry.name, entry.value);
                }
                _ => {
                    current.remove(&entry.name);
                }
            }
        }

        self.store(&current).await
    }
}
