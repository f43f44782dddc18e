//! The key-value store: a shared skip list index plus its snapshot file.

use anyhow::{Context, Result};
use log::info;
use skiplist::{DeleteResult, InsertResult, SkipList};
use snapshot::LoadStats;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::StoreConfig;

/// String-keyed store over a [`SkipList`].
///
/// # Write Path
///
/// `set` and `del` go straight to the index, which serializes them behind
/// its write lock. Nothing is persisted until [`Store::dump`] is called.
///
/// # Read Path
///
/// `get` takes the index's read lock and clones the value out.
///
/// # Snapshots
///
/// `dump` writes the whole index to the configured snapshot path (creating
/// its parent directory); `load` merges a snapshot into the live index,
/// keeping live values for keys present in both.
///
/// The store is cheap to clone: clones share the same index.
#[derive(Clone)]
pub struct Store {
    index: Arc<SkipList<String, String>>,
    config: StoreConfig,
}

impl Store {
    /// Creates a store from `config`, loading the existing snapshot first if
    /// `config.load_on_start` is set and the file exists.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let store = Self {
            index: Arc::new(SkipList::new(config.max_level)),
            config,
        };

        if store.config.load_on_start {
            if store.config.snapshot_path.exists() {
                store.load()?;
            } else {
                info!(
                    "no snapshot at {}, starting empty",
                    store.config.snapshot_path.display()
                );
            }
        }

        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Stores `value` under `key` (the `SET` command). Never overwrites.
    pub fn set(&self, key: String, value: String) -> InsertResult {
        self.index.insert(key, value)
    }

    /// Looks up `key` (the `GET` command).
    pub fn get(&self, key: &str) -> Option<String> {
        self.index.search(key)
    }

    /// Removes `key` (the `DEL` command).
    pub fn del(&self, key: &str) -> DeleteResult {
        self.index.delete(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Renders every level of the index, highest first (the `SHOW` command).
    pub fn show(&self) -> String {
        self.index.display().to_string()
    }

    /// Writes the index to the snapshot path, returning the record count.
    pub fn dump(&self) -> Result<usize> {
        let path = &self.config.snapshot_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
        }
        snapshot::dump(path, self.index.as_ref())
            .with_context(|| format!("dumping snapshot to {}", path.display()))
    }

    /// Merges the snapshot at the configured path into the index.
    pub fn load(&self) -> Result<LoadStats> {
        self.load_from(&self.config.snapshot_path)
    }

    pub fn load_from(&self, path: &Path) -> Result<LoadStats> {
        snapshot::load(path, self.index.as_ref())
            .with_context(|| format!("loading snapshot from {}", path.display()))
    }
}
