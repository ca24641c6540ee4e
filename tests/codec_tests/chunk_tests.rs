//! Tests for chunk creation and reassembly
//!
//! These tests verify:
//! - Round trip at and around the chunk size boundary
//! - Chunk naming and sizes
//! - Gap handling during reconstruction
//! - Older `key.0` layouts stay readable and removable
//! - Chunk deletion traversal

use std::collections::HashMap;

use chunkjar::codec::{combine_chunks, create_chunks, delete_chunks, Chunk};
use chunkjar::Result;
use parking_lot::Mutex;

const MAX: usize = 3180;

// =============================================================================
// Helper Functions
// =============================================================================

fn to_map(chunks: &[Chunk]) -> HashMap<String, String> {
    chunks
        .iter()
        .map(|c| (c.name.clone(), c.value.clone()))
        .collect()
}

async fn combine_from(key: &str, map: &HashMap<String, String>) -> Result<Option<String>> {
    combine_chunks(key, |name| {
        let value = map.get(&name).cloned();
        async move { Ok(value) }
    })
    .await
}

fn value_of_len(len: usize) -> String {
    (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[tokio::test]
async fn test_round_trip_boundary_lengths() {
    for len in [0, MAX - 1, MAX, MAX + 1, 5 * MAX + 7] {
        let value = value_of_len(len);
        let chunks = create_chunks("sb-auth", &value, MAX);
        let map = to_map(&chunks);

        let combined = combine_from("sb-auth", &map).await.unwrap();
        assert_eq!(combined.as_deref(), Some(value.as_str()), "length {}", len);
    }
}

#[tokio::test]
async fn test_round_trip_multibyte() {
    let value = "héllo wörld ✓ ".repeat(50);
    let chunks = create_chunks("k", &value, 16);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.value.len() <= 16);
    }

    let combined = combine_from("k", &to_map(&chunks)).await.unwrap();
    assert_eq!(combined, Some(value));
}

// =============================================================================
// Naming Tests
// =============================================================================

#[test]
fn test_small_value_single_unsuffixed_chunk() {
    let chunks = create_chunks("tok", "abc", MAX);
    assert_eq!(chunks, vec![Chunk::new("tok", "abc")]);
}

#[test]
fn test_empty_value_single_empty_chunk() {
    let chunks = create_chunks("tok", "", MAX);
    assert_eq!(chunks, vec![Chunk::new("tok", "")]);
}

#[test]
fn test_exact_multiple_has_no_trailing_empty_chunk() {
    let chunks = create_chunks("tok", &value_of_len(2 * MAX), MAX);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].value.len(), MAX);
}

#[tokio::test]
async fn test_zero_size_still_makes_progress() {
    let chunks = create_chunks("k", "abc", 0);
    let names: Vec<&str> = chunks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["k", "k.1", "k.2"]);

    let combined = combine_from("k", &to_map(&chunks)).await.unwrap();
    assert_eq!(combined.as_deref(), Some("abc"));
}

#[test]
fn test_chunk_names_are_sequential() {
    let value = value_of_len(4 * MAX + 1);
    let names: Vec<String> = create_chunks("k", &value, MAX)
        .into_iter()
        .map(|c| c.name)
        .collect();

    assert_eq!(names, vec!["k", "k.1", "k.2", "k.3", "k.4"]);
}

#[test]
fn test_concrete_token_split() {
    let value = value_of_len(8000);
    let chunks = create_chunks("tok", &value, MAX);

    let layout: Vec<(&str, usize)> = chunks
        .iter()
        .map(|c| (c.name.as_str(), c.value.len()))
        .collect();
    assert_eq!(layout, vec![("tok", 3180), ("tok.1", 3180), ("tok.2", 1640)]);
}

// =============================================================================
// Reconstruction Tests
// =============================================================================

#[tokio::test]
async fn test_combine_missing_key_is_none() {
    let map = HashMap::new();
    assert_eq!(combine_from("absent", &map).await.unwrap(), None);
}

#[tokio::test]
async fn test_combine_empty_head_is_some() {
    let map = to_map(&[Chunk::new("k", "")]);
    assert_eq!(combine_from("k", &map).await.unwrap(), Some(String::new()));
}

#[tokio::test]
async fn test_combine_stops_at_gap() {
    let map = to_map(&[
        Chunk::new("k", "aa"),
        Chunk::new("k.1", "bb"),
        Chunk::new("k.3", "dd"),
    ]);

    assert_eq!(combine_from("k", &map).await.unwrap().as_deref(), Some("aabb"));
}

#[tokio::test]
async fn test_combine_ignores_other_keys() {
    let map = to_map(&[Chunk::new("k", "v"), Chunk::new("kk.1", "x")]);
    assert_eq!(combine_from("k", &map).await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn test_combine_reads_zero_indexed_layout() {
    let map = to_map(&[
        Chunk::new("k.0", "aa"),
        Chunk::new("k.1", "bb"),
        Chunk::new("k.2", "cc"),
    ]);

    assert_eq!(combine_from("k", &map).await.unwrap().as_deref(), Some("aabbcc"));
}

#[tokio::test]
async fn test_combine_prefers_unsuffixed_head() {
    let map = to_map(&[
        Chunk::new("k", "new"),
        Chunk::new("k.0", "old"),
        Chunk::new("k.1", "-tail"),
    ]);

    assert_eq!(combine_from("k", &map).await.unwrap().as_deref(), Some("new-tail"));
}

#[tokio::test]
async fn test_combine_propagates_fetch_error() {
    let result = combine_chunks("k", |_name| async {
        Err(chunkjar::ChunkJarError::Backing("down".to_string()))
    })
    .await;

    assert!(matches!(result, Err(chunkjar::ChunkJarError::Backing(_))));
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[tokio::test]
async fn test_delete_chunks_removes_family_until_gap() {
    let store = Mutex::new(to_map(&[
        Chunk::new("k", "a"),
        Chunk::new("k.1", "b"),
        Chunk::new("k.2", "c"),
        Chunk::new("k.4", "orphan"),
        Chunk::new("other", "keep"),
    ]));

    let removed = delete_chunks(
        "k",
        |name| {
            let value = store.lock().get(&name).cloned();
            async move { Ok(value) }
        },
        |name| {
            store.lock().remove(&name);
            async { Ok(()) }
        },
    )
    .await
    .unwrap();

    assert_eq!(removed, 3);

    let mut left: Vec<String> = store.lock().keys().cloned().collect();
    left.sort();
    assert_eq!(left, vec!["k.4", "other"]);
}

#[tokio::test]
async fn test_delete_chunks_missing_key() {
    let mut remove_calls = 0;

    let removed = delete_chunks(
        "k",
        |_name| async { Ok(None) },
        |_name| {
            remove_calls += 1;
            async { Ok(()) }
        },
    )
    .await
    .unwrap();

    assert_eq!(removed, 0);
    assert_eq!(remove_calls, 0);
}

#[tokio::test]
async fn test_delete_chunks_removes_zero_indexed_layout() {
    let store = Mutex::new(to_map(&[
        Chunk::new("k.0", "a"),
        Chunk::new("k.1", "b"),
        Chunk::new("other", "keep"),
    ]));

    let removed = delete_chunks(
        "k",
        |name| {
            let value = store.lock().get(&name).cloned();
            async move { Ok(value) }
        },
        |name| {
            store.lock().remove(&name);
            async { Ok(()) }
        },
    )
    .await
    .unwrap();

    assert_eq!(removed, 2);

    let left: Vec<String> = store.lock().keys().cloned().collect();
    assert_eq!(left, vec!["other"]);
}
