// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value configuration store for tokens, vehicle identity and home.

pub mod file;

pub use file::FileConfigStore;

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Persisted key names.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
    pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
    pub const VIN: &str = "VIN";
    pub const ID_S: &str = "ID_S";
    pub const DISPLAY_NAME: &str = "DISPLAY_NAME";
    pub const HOME_LATITUDE: &str = "HOME_LATITUDE";
    pub const HOME_LONGITUDE: &str = "HOME_LONGITUDE";
}

/// Persistent key-value store.
///
/// Values are plain strings; an empty value reads back as `None`.
pub trait ConfigStore: Send + Sync {
    /// Read a single value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a batch of values at once.
    fn update(&self, changes: &[(&str, String)]) -> Result<(), StoreError>;

    /// Read a value and parse it as a float. Unparsable values read as `None`.
    fn get_f64(&self, key: &str) -> Result<Option<f64>, StoreError> {
        Ok(self.get(key)?.and_then(|v| v.trim().parse().ok()))
    }
}

/// In-memory store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given pairs.
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).filter(|v| !v.is_empty()).cloned())
    }

    fn update(&self, changes: &[(&str, String)]) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in changes {
            values.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// Errors from the config store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
