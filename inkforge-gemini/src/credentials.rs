//! API key storage and resolution.
//!
//! Keys can be stored per feature (research, panels, cover, ...) or under a
//! shared default slot. Resolution walks a fixed chain so a key supplied on
//! the request always wins and the process environment is the last resort.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ModelError;

/// Slot name for the shared default key.
pub const SHARED_FEATURE: &str = "default";

/// Slot name kept for installations that stored their key under the old
/// variable-style name.
const LEGACY_FEATURE: &str = "GEMINI_API_KEY";

/// Environment variables consulted, in order.
const ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Thread-safe store of API keys with chained resolution.
pub struct CredentialStore {
    keys: RwLock<HashMap<String, String>>,
    env_reader: fn(&str) -> Option<String>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Create an empty store backed by the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            env_reader: read_env,
        }
    }

    /// Create a store that never consults the process environment. Useful
    /// for hermetic tests and multi-tenant setups where ambient keys must
    /// not leak in.
    #[must_use]
    pub fn isolated() -> Self {
        Self::with_env(|_| None)
    }

    fn with_env(env_reader: fn(&str) -> Option<String>) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            env_reader,
        }
    }

    /// Store a key for one feature. Empty or whitespace-only keys are
    /// treated as a removal.
    pub fn set(&self, feature: &str, key: &str) {
        let key = key.trim();
        let mut keys = self.keys.write();
        if key.is_empty() {
            keys.remove(feature);
        } else {
            keys.insert(feature.to_string(), key.to_string());
        }
    }

    /// Store the shared default key.
    pub fn set_shared(&self, key: &str) {
        self.set(SHARED_FEATURE, key);
    }

    /// Remove a feature's stored key.
    pub fn remove(&self, feature: &str) {
        self.keys.write().remove(feature);
    }

    /// Resolve the key to use for `feature`.
    ///
    /// Order: explicit request key, the feature's stored key, the shared
    /// default, the legacy slot, then the `GEMINI_API_KEY` and
    /// `GOOGLE_API_KEY` environment variables.
    pub fn resolve(
        &self,
        feature: &str,
        request_key: Option<&str>,
    ) -> Result<String, ModelError> {
        if let Some(key) = request_key.map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }

        {
            let keys = self.keys.read();
            for slot in [feature, SHARED_FEATURE, LEGACY_FEATURE] {
                if let Some(key) = keys.get(slot) {
                    debug!(feature, slot, "resolved API key from store");
                    return Ok(key.clone());
                }
            }
        }

        for var in ENV_VARS {
            if let Some(key) = (self.env_reader)(var)
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
            {
                debug!(feature, var, "resolved API key from environment");
                return Ok(key);
            }
        }

        Err(ModelError::MissingCredential {
            feature: feature.to_string(),
        })
    }
}
