//! # chunkjar
//!
//! Chunked key/value storage for size-capped backing stores such as HTTP
//! cookies:
//! - Transparent splitting of oversized values into bounded chunks
//! - Reassembly on read, with gap-as-end-of-value semantics
//! - Incremental mode for stores with single-entry get/set/remove
//! - Buffered mode for batch-only stores, with minimal reconciliation on flush
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ServerClient                            │
//! │            (auth events → FlushTrigger)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ SessionStorage
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Storage                                │
//! │          (variant chosen once from Backing)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Incremental │          │  Buffered   │──► Overlay
//!   │  Adapter    │          │  Adapter    │──► Reconcile
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ get/set/rm  │          │get_all/     │
//!   │  per chunk  │          │set_all      │
//!   └─────────────┘          └─────────────┘
//!            (Chunk Codec used on both paths)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod overlay;
pub mod backing;
pub mod adapter;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChunkJarError, Result};
pub use config::{Config, CookieOptions};
pub use adapter::{FlushReport, FlushTrigger, SessionStorage, Storage};
pub use backing::Backing;
pub use client::{AuthEvent, ServerClient};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of chunkjar
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
