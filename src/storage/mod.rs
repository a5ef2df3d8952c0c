// SPDX-License-Identifier: MPL-2.0
//! Persistent key-value slots.
//!
//! The client keeps exactly two pieces of durable state, the access key and
//! the locale preference, each in a single slot addressed by a fixed key.
//! Components receive the store as an optional capability so they keep
//! working (with nothing persisted) when no storage is available.
//!
//! - [`MemoryStore`]: process-local map, used by tests and ephemeral sessions
//! - [`FileStore`]: CBOR file in the application data directory

mod file;

pub use file::FileStore;

use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Storage key of the API access key.
pub const ACCESS_KEY_STORAGE: &str = "nginxpulse_access_key";

/// Storage key of the persisted UI locale.
pub const LOCALE_STORAGE: &str = "nginxpulse_locale";

/// A synchronous string-to-string store with last-write-wins semantics.
pub trait KeyValueStore: Send + Sync {
    /// Returns the current value of `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
