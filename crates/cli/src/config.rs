//! Store configuration, read once at startup.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use skiplist::DEFAULT_MAX_LEVEL;

/// Overrides [`StoreConfig::max_level`].
pub const ENV_MAX_LEVEL: &str = "SKIPKV_MAX_LEVEL";
/// Overrides [`StoreConfig::snapshot_path`].
pub const ENV_SNAPSHOT_PATH: &str = "SKIPKV_SNAPSHOT_PATH";
/// Overrides [`StoreConfig::load_on_start`].
pub const ENV_LOAD_ON_START: &str = "SKIPKV_LOAD_ON_START";

/// Settings for a [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Tallest level any node of the index may reach. Must be at least 1.
    pub max_level: usize,

    /// Where `DUMP` writes and `LOAD` reads the snapshot.
    pub snapshot_path: PathBuf,

    /// If `true`, an existing snapshot is loaded when the store opens.
    pub load_on_start: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            snapshot_path: PathBuf::from("store/dumpFile"),
            load_on_start: false,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by any `SKIPKV_*` variables that are set.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse,
    /// or if `SKIPKV_MAX_LEVEL` is zero.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](StoreConfig::from_env) but reads variables
    /// through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_MAX_LEVEL) {
            cfg.max_level = raw
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {:?}", ENV_MAX_LEVEL, raw))?;
        }
        if let Some(raw) = lookup(ENV_SNAPSHOT_PATH) {
            cfg.snapshot_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup(ENV_LOAD_ON_START) {
            cfg.load_on_start = parse_flag(&raw)
                .with_context(|| format!("{} is not a boolean: {:?}", ENV_LOAD_ON_START, raw))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            bail!("max_level must be at least 1");
        }
        if self.snapshot_path.as_os_str().is_empty() {
            bail!("snapshot path must not be empty");
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag {:?}", other),
    }
}
