//! Buffered Bulk Adapter
//!
//! Chunked storage over a batch-only backing store. Mutations land in an
//! [`Overlay`] and reach the store in one batch when the caller flushes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::backing::{BatchSink, BatchSource, Snapshot};
use crate::codec::combine_chunks;
use crate::config::Config;
use crate::error::{ChunkJarError, Result};
use crate::overlay::{Overlay, OverlayEntry};

use super::reconcile::reconcile;
use super::{FlushReport, FlushTrigger, SessionStorage};

/// Adapter over a bulk backing store
///
/// ## Read Path
/// 1. Overlay (pending value, or `None` for a pending removal)
/// 2. Snapshot of the backing store, fetched on first use and kept until
///    the next flush
///
/// ## Flush Path
/// 1. Fresh batch read
/// 2. Reconcile overlay against it
/// 3. One batch write, removals before sets
pub struct BufferedAdapter {
    config: Config,
    source: Arc<dyn BatchSource>,
    sink: Option<Arc<dyn BatchSink>>,

    /// Pending mutations for this unit of work
    overlay: Overlay,

    /// Read-side snapshot, dropped on every flush
    cached: Option<Snapshot>,
}

impl BufferedAdapter {
    /// Build the adapter. Fails if the config is invalid.
    pub fn new(
        config: Config,
        source: Arc<dyn BatchSource>,
        sink: Option<Arc<dyn BatchSink>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            sink,
            overlay: Overlay::new(),
            cached: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pending state of this unit of work
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    async fn snapshot(&mut self) -> Result<&Snapshot> {
        let snapshot = match self.cached.take() {
            Some(snapshot) => snapshot,
            None => {
                let snapshot = Snapshot::fetch(self.source.as_ref()).await?;
                debug!(chunks = snapshot.len(), "Fetched backing snapshot");
                snapshot
            }
        };
        Ok(self.cached.insert(snapshot))
    }
}

#[async_trait]
impl SessionStorage for BufferedAdapter {
    async fn get_item(&mut self, key: &str) -> Result<Option<String>> {
        match self.overlay.get(key) {
            Some(OverlayEntry::Value(value)) => return Ok(Some(value.clone())),
            Some(OverlayEntry::Removed) => return Ok(None),
            None => {}
        }

        let snapshot = self.snapshot().await?;
        combine_chunks(key, |name| {
            let value = snapshot.get(&name).map(str::to_owned);
            async move { Ok(value) }
        })
        .await
    }

    async fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.overlay.set(key, value);
        Ok(())
    }

    async fn remove_item(&mut self, key: &str) -> Result<()> {
        self.overlay.remove(key);
        Ok(())
    }

    async fn flush(&mut self, trigger: FlushTrigger) -> Result<FlushReport> {
        self.cached = None;

        if self.overlay.is_empty() {
            debug!(?trigger, "Nothing pending, skipping flush");
            return Ok(FlushReport::empty(trigger));
        }

        let Some(sink) = self.sink.clone() else {
            let err = ChunkJarError::UnsupportedCapability { operation: "set_all" };
            warn!(
                ?trigger,
                pending = self.overlay.len(),
                "{}; pending changes were not persisted",
                err
            );
            return Ok(FlushReport::empty(trigger));
        };

        let existing = Snapshot::fetch(self.source.as_ref()).await?;
        let plan = reconcile(&existing, &self.overlay, self.config.max_chunk_size);

        let report = FlushReport {
            trigger,
            removed: plan.to_remove.len(),
            written: plan.to_set.len(),
        };

        if plan.is_empty() {
            debug!(?trigger, "Backing store already up to date");
            return Ok(report);
        }

        sink.set_all(plan.into_batch(&self.config)).await?;

        info!(
            ?trigger,
            removed = report.removed,
            written = report.written,
            "Flushed overlay"
        );

        Ok(report)
    }
}
