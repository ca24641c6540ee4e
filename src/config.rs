//! Configuration for chunkjar
//!
//! Centralized configuration with sensible defaults.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkJarError, Result};

/// Default max chunk size: a 4096 byte cookie minus headroom for the
/// name and attributes.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 3180;

/// Smallest accepted chunk size. Must fit any single UTF-8 scalar.
pub const MIN_CHUNK_SIZE: usize = 4;

/// Default retention for written chunks: 400 days, the browser cap.
pub const DEFAULT_MAX_AGE: u64 = 400 * 24 * 60 * 60;

/// Main configuration for a chunkjar adapter
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Chunking Configuration
    // -------------------------------------------------------------------------
    /// Upper bound (in bytes) for the value of every physical chunk
    pub max_chunk_size: usize,

    // -------------------------------------------------------------------------
    // Write Attributes
    // -------------------------------------------------------------------------
    /// Attributes applied uniformly to all chunks of an entry
    pub cookie_options: CookieOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            cookie_options: CookieOptions::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration before an adapter is built from it
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size < MIN_CHUNK_SIZE {
            return Err(ChunkJarError::Config(format!(
                "max_chunk_size must be at least {} bytes, got {}",
                MIN_CHUNK_SIZE, self.max_chunk_size
            )));
        }

        if matches!(self.cookie_options.name.as_deref(), Some("")) {
            return Err(ChunkJarError::Config(
                "cookie name must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Attributes used when writing a chunk
    pub fn set_options(&self) -> CookieOptions {
        CookieOptions {
            max_age: Some(DEFAULT_MAX_AGE),
            ..self.cookie_options.clone()
        }
    }

    /// Attributes used when removing a chunk (expires immediately)
    pub fn remove_options(&self) -> CookieOptions {
        CookieOptions {
            max_age: Some(0),
            ..self.cookie_options.clone()
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum chunk size (in bytes)
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Replace all cookie attributes
    pub fn cookie_options(mut self, options: CookieOptions) -> Self {
        self.config.cookie_options = options;
        self
    }

    /// Set the cookie name (used as the storage key by the client)
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.config.cookie_options.name = Some(name.into());
        self
    }

    /// Set the cookie domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.cookie_options.domain = Some(domain.into());
        self
    }

    /// Set the Secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.config.cookie_options.secure = secure;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Per-entry write attributes.
///
/// Opaque to the chunking logic: they are passed through to the backing
/// store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieOptions {
    /// Cookie name; when set, the client uses it as the storage key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    pub same_site: SameSite,

    pub http_only: bool,

    pub secure: bool,

    /// Retention in seconds; `Some(0)` expires the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            domain: None,
            same_site: SameSite::Lax,
            http_only: false,
            secure: false,
            max_age: Some(DEFAULT_MAX_AGE),
        }
    }
}

impl CookieOptions {
    /// Render a `Set-Cookie` header value for `name=value` with these attributes
    pub fn to_set_cookie(&self, name: &str, value: &str) -> String {
        let mut header = format!("{}={}", name, value);

        if let Some(max_age) = self.max_age {
            let _ = write!(header, "; Max-Age={}", max_age);
        }
        if let Some(domain) = &self.domain {
            let _ = write!(header, "; Domain={}", domain);
        }
        let _ = write!(header, "; Path={}", self.path);
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        let _ = write!(header, "; SameSite={}", self.same_site.as_str());

        header
    }
}
