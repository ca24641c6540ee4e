//! Server Client
//!
//! Builds the storage adapter for a server-side auth client and drives its
//! flushes from auth events.
//!
//! ## Responsibilities
//! - Validate the project URL and API key
//! - Derive the storage key (cookie name, or `sb-<project ref>-auth-token`)
//! - Merge user options over the server defaults
//! - Map auth events onto [`FlushTrigger`]s

use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::adapter::{FlushReport, FlushTrigger, SessionStorage, Storage};
use crate::backing::Backing;
use crate::config::Config;
use crate::error::{ChunkJarError, Result};

const MISSING_CREDENTIALS: &str = "Your project's URL and Key are required to create a server client!\n\n\
     Check your project's API settings to find these values";

/// Auth state changes reported by an auth client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
    MfaChallengeVerified,
}

impl AuthEvent {
    /// The flush this event calls for, if any
    pub fn flush_trigger(self) -> Option<FlushTrigger> {
        match self {
            AuthEvent::TokenRefreshed => Some(FlushTrigger::Refreshed),
            AuthEvent::UserUpdated => Some(FlushTrigger::Updated),
            AuthEvent::SignedOut => Some(FlushTrigger::SignedOut),
            _ => None,
        }
    }
}

/// Builder for [`ServerClient`]
pub struct ServerClientBuilder {
    url: String,
    key: String,
    config: Config,
    overrides: Value,
}

impl ServerClientBuilder {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            config: Config::default(),
            overrides: Value::Object(Map::new()),
        }
    }

    /// Chunking and cookie configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// User-defined client options, merged over the defaults
    pub fn options(mut self, overrides: Value) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn build(self, backing: Backing) -> Result<ServerClient> {
        if self.url.is_empty() || self.key.is_empty() {
            return Err(ChunkJarError::Config(MISSING_CREDENTIALS.to_string()));
        }

        let url = Url::parse(&self.url)
            .map_err(|e| ChunkJarError::Config(format!("invalid project URL {:?}: {}", self.url, e)))?;

        let mut overrides = self.overrides;
        if let Some(name) = &self.config.cookie_options.name {
            overrides = merge_deep_right(overrides, json!({ "auth": { "storageKey": name } }));
        }

        let defaults = default_options(&url);
        let options = merge_deep_right(defaults, overrides);

        let storage_key = options
            .pointer("/auth/storageKey")
            .and_then(Value::as_str)
            .ok_or_else(|| ChunkJarError::Config("auth.storageKey must be a string".to_string()))?
            .to_string();

        let storage = Storage::new(self.config, backing)?;

        debug!(%url, storage_key = %storage_key, buffered = storage.is_buffered(), "Built server client");

        Ok(ServerClient {
            url,
            key: self.key,
            storage_key,
            options,
            storage,
        })
    }
}

/// Server-side client state: merged options plus the chunked storage
pub struct ServerClient {
    url: Url,
    key: String,
    storage_key: String,
    options: Value,
    storage: Storage,
}

impl ServerClient {
    pub fn builder(url: impl Into<String>, key: impl Into<String>) -> ServerClientBuilder {
        ServerClientBuilder::new(url, key)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.key
    }

    /// Key under which the session is stored
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Merged client options
    pub fn options(&self) -> &Value {
        &self.options
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Read the stored session
    pub async fn session(&mut self) -> Result<Option<String>> {
        self.storage.get_item(&self.storage_key).await
    }

    /// Store a session
    pub async fn save_session(&mut self, session: &str) -> Result<()> {
        self.storage.set_item(&self.storage_key, session).await
    }

    /// Forget the stored session
    pub async fn clear_session(&mut self) -> Result<()> {
        self.storage.remove_item(&self.storage_key).await
    }

    /// React to an auth state change. Refresh, update and sign-out flush
    /// pending storage writes; every other event is ignored.
    pub async fn handle_auth_event(&mut self, event: AuthEvent) -> Result<Option<FlushReport>> {
        let Some(trigger) = event.flush_trigger() else {
            return Ok(None);
        };

        info!(?event, "Auth state changed, flushing storage");
        self.storage.flush(trigger).await.map(Some)
    }
}

/// Server defaults: PKCE, persisted session, no browser-only behaviour
fn default_options(url: &Url) -> Value {
    json!({
        "global": {
            "headers": {
                "X-Client-Info": format!("chunkjar/{}", crate::VERSION),
            }
        },
        "auth": {
            "flowType": "pkce",
            "autoRefreshToken": false,
            "detectSessionInUrl": false,
            "persistSession": true,
            "storageKey": default_storage_key(url),
        }
    })
}

/// `sb-<first host label>-auth-token`
pub fn default_storage_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let project_ref = host.split('.').next().unwrap_or_default();
    format!("sb-{}-auth-token", project_ref)
}

/// Deep merge where `right` wins. Objects merge key by key; any other
/// value in `right` replaces the one in `left`.
pub fn merge_deep_right(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                let merged = match left.remove(&key) {
                    Some(existing) => merge_deep_right(existing, value),
                    None => value,
                };
                left.insert(key, merged);
            }
            Value::Object(left)
        }
        (_, right) => right,
    }
}
