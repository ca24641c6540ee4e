//! Chunk name encoding
//!
//! `{base, index}` <-> `"base"` / `"base.N"`.

use std::fmt;

/// A parsed chunk name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkName<'a> {
    /// Logical key the chunk belongs to
    pub base: &'a str,

    /// Position suffix; `None` for an unsuffixed (head) chunk
    pub index: Option<usize>,
}

impl<'a> ChunkName<'a> {
    /// Name of the chunk at `index` within the family of `base`.
    /// Index 0 is the head chunk and carries no suffix.
    pub fn new(base: &'a str, index: usize) -> Self {
        let index = if index == 0 { None } else { Some(index) };
        Self { base, index }
    }

    /// Head chunk in the older `base.0` layout. Only read and removed,
    /// never written.
    pub fn legacy_head(base: &'a str) -> Self {
        Self {
            base,
            index: Some(0),
        }
    }

    /// Parse a physical name.
    ///
    /// Total: a trailing `.0` or `.N` (no leading zeros) is read as an index
    /// suffix, anything else is an unsuffixed name.
    pub fn parse(name: &'a str) -> Self {
        if let Some((base, suffix)) = name.rsplit_once('.') {
            if let Some(index) = parse_index(suffix) {
                return Self {
                    base,
                    index: Some(index),
                };
            }
        }

        Self {
            base: name,
            index: None,
        }
    }

    /// Whether `name` is a chunk of `key`: either the head chunk or a
    /// suffixed chunk whose base is `key`.
    pub fn belongs_to(name: &str, key: &str) -> bool {
        if name == key {
            return true;
        }
        let parsed = ChunkName::parse(name);
        parsed.index.is_some() && parsed.base == key
    }
}

impl fmt::Display for ChunkName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}.{}", self.base, index),
            None => f.write_str(self.base),
        }
    }
}

/// Names of the chunk family of `key`, in traversal order:
/// `key`, `key.1`, `key.2`, ...
pub fn chunk_family(key: &str) -> impl Iterator<Item = String> + '_ {
    (0..).map(move |index| ChunkName::new(key, index).to_string())
}

/// `0` or a digit string without leading zeros
fn parse_index(suffix: &str) -> Option<usize> {
    let bytes = suffix.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    suffix.parse().ok()
}
