//! Chunk creation and reassembly

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::name::{chunk_family, ChunkName};

/// One bounded-size physical entry holding a slice of a logical value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub name: String,
    pub value: String,
}

impl Chunk {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Split `value` into chunks of at most `max_chunk_size` bytes.
///
/// Slices end on `char` boundaries. `max_chunk_size` must be at least
/// `MIN_CHUNK_SIZE`, which `Config::validate` enforces.
pub fn create_chunks(key: &str, value: &str, max_chunk_size: usize) -> Vec<Chunk> {
    if value.len() <= max_chunk_size {
        return vec![Chunk::new(key, value)];
    }

    let mut chunks = Vec::with_capacity(value.len().div_ceil(max_chunk_size.max(1)));
    let mut start = 0;

    while start < value.len() {
        let mut end = (start + max_chunk_size).min(value.len());
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        // Only reachable with a limit below one scalar; never stall.
        if end == start {
            end = start + 1;
            while !value.is_char_boundary(end) {
                end += 1;
            }
        }

        let name = ChunkName::new(key, chunks.len()).to_string();
        chunks.push(Chunk::new(name, &value[start..end]));
        start = end;
    }

    chunks
}

/// Reassemble the value of `key` from its chunks.
///
/// Fetches `key`, `key.1`, `key.2`, ... and stops at the first missing
/// index. A gap is treated as end-of-value. A missing head falls back to
/// `key.0`, the head of the older layout. Returns `None` when neither head
/// exists.
pub async fn combine_chunks<F, Fut>(key: &str, mut fetch: F) -> Result<Option<String>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    let head = match fetch(key.to_string()).await? {
        Some(head) => head,
        None => match fetch(ChunkName::legacy_head(key).to_string()).await? {
            Some(head) => head,
            None => return Ok(None),
        },
    };

    let mut combined = head;
    let mut count = 1usize;

    for name in chunk_family(key).skip(1) {
        match fetch(name).await? {
            Some(part) => {
                combined.push_str(&part);
                count += 1;
            }
            None => break,
        }
    }

    if count > 1 {
        debug!(key, chunks = count, "Combined chunked value");
    }

    Ok(Some(combined))
}

/// Remove every chunk of `key`, using the same traversal as
/// [`combine_chunks`]. Returns the number of chunks removed.
pub async fn delete_chunks<F, FFut, R, RFut>(
    key: &str,
    mut fetch: F,
    mut remove: R,
) -> Result<usize>
where
    F: FnMut(String) -> FFut,
    FFut: Future<Output = Result<Option<String>>>,
    R: FnMut(String) -> RFut,
    RFut: Future<Output = Result<()>>,
{
    let mut removed = 0usize;

    // Either head starts the family; clear both so no older layout survives
    for name in [key.to_string(), ChunkName::legacy_head(key).to_string()] {
        if fetch(name.clone()).await?.is_some() {
            remove(name).await?;
            removed += 1;
        }
    }
    if removed == 0 {
        return Ok(0);
    }

    for name in chunk_family(key).skip(1) {
        if fetch(name.clone()).await?.is_none() {
            break;
        }
        remove(name).await?;
        removed += 1;
    }

    if removed > 0 {
        debug!(key, chunks = removed, "Deleted chunks");
    }

    Ok(removed)
}
