//! Chunk Codec Module
//!
//! Splits values into bounded-size chunks and reassembles them.
//!
//! ## Responsibilities
//! - Split a value into ordered chunks no larger than the max chunk size
//! - Reassemble a value from its chunks, stopping at the first gap
//! - Delete every chunk of a key
//! - Parse and format chunk names
//!
//! ## Chunk Layout
//! ```text
//! value fits:       [ key ]
//! value too large:  [ key ][ key.1 ][ key.2 ] ... [ key.(n-1) ]
//! ```
//! The head chunk is never suffixed, so a single-chunk entry and the first
//! chunk of a multi-chunk entry share the same name.

mod chunk;
mod name;

pub use chunk::{combine_chunks, create_chunks, delete_chunks, Chunk};
pub use name::{chunk_family, ChunkName};
