//! Incremental Adapter
//!
//! Chunked storage over a backing store with single-entry access.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::backing::{ChunkRemover, ChunkSetter, ChunkSource};
use crate::codec::{combine_chunks, create_chunks, delete_chunks};
use crate::config::Config;
use crate::error::{ChunkJarError, Result};

use super::{FlushReport, FlushTrigger, SessionStorage};

/// Adapter over an incremental backing store
///
/// Every logical operation maps straight onto backing calls; nothing is
/// buffered. There is no cross-chunk atomicity: a failure between two
/// backing calls can leave a partial entry, which the next `set_item` for
/// that key cleans up.
pub struct IncrementalAdapter {
    config: Config,
    source: Arc<dyn ChunkSource>,
    setter: Option<Arc<dyn ChunkSetter>>,
    remover: Option<Arc<dyn ChunkRemover>>,
}

impl IncrementalAdapter {
    /// Build the adapter. Fails if the config is invalid.
    pub fn new(
        config: Config,
        source: Arc<dyn ChunkSource>,
        setter: Option<Arc<dyn ChunkSetter>>,
        remover: Option<Arc<dyn ChunkRemover>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            setter,
            remover,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Delete every chunk of `key` through the remover
    async fn delete_all(&self, key: &str, remover: &Arc<dyn ChunkRemover>) -> Result<usize> {
        let options = self.config.remove_options();

        delete_chunks(
            key,
            |name| {
                let source = Arc::clone(&self.source);
                async move { source.get(&name).await }
            },
            |name| {
                let remover = Arc::clone(remover);
                let options = options.clone();
                async move { remover.remove(&name, &options).await }
            },
        )
        .await
    }

    /// Log and skip a mutation the backing cannot perform
    fn unsupported(&self, operation: &'static str, key: &str) {
        let err = ChunkJarError::UnsupportedCapability { operation };
        warn!(
            key,
            "{}; declare the matching write primitive on the incremental backing",
            err
        );
    }
}

#[async_trait]
impl SessionStorage for IncrementalAdapter {
    async fn get_item(&mut self, key: &str) -> Result<Option<String>> {
        combine_chunks(key, |name| {
            let source = Arc::clone(&self.source);
            async move { source.get(&name).await }
        })
        .await
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let Some(setter) = self.setter.clone() else {
            self.unsupported("set", key);
            return Ok(());
        };

        // Clear the old layout first so a shorter value leaves no stale
        // high-index chunks behind
        match self.remover.clone() {
            Some(remover) => {
                self.delete_all(key, &remover).await?;
            }
            None => self.unsupported("remove", key),
        }

        let options = self.config.set_options();
        let chunks = create_chunks(key, value, self.config.max_chunk_size);
        debug!(key, chunks = chunks.len(), "Writing chunked value");

        for chunk in &chunks {
            setter.set(&chunk.name, &chunk.value, &options).await?;
        }

        Ok(())
    }

    async fn remove_item(&mut self, key: &str) -> Result<()> {
        let Some(remover) = self.remover.clone() else {
            self.unsupported("remove", key);
            return Ok(());
        };

        self.delete_all(key, &remover).await?;
        Ok(())
    }

    /// Writes are applied immediately; there is nothing to flush.
    async fn flush(&mut self, trigger: FlushTrigger) -> Result<FlushReport> {
        Ok(FlushReport::empty(trigger))
    }
}
