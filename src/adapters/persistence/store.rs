//! Key/Value Store - Atomic JSON Persistence
//!
//! Each key maps to `<key>.json` in the data directory. Writes go to a
//! temporary file first, then rename over the final path, so a reader
//! always sees either the old or the new version, never a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, instrument};

/// Atomic per-key JSON store.
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .context("Failed to create data directory")?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Write `value` under `key` atomically (tmp → rename).
    #[instrument(skip(self, value))]
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));

        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize `{key}`"))?;

        fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write tmp file for `{key}`"))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to rename `{key}` into place"))?;

        debug!(key, path = %path.display(), bytes = json.len(), "Key persisted");
        Ok(())
    }

    /// Read the value under `key`, or `None` if it was never written.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(key, "No stored value");
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read `{key}`"))?;
        let value = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse stored `{key}`"))?;
        Ok(Some(value))
    }

    /// Check the data directory is present and stat-able.
    pub async fn is_healthy(&self) -> bool {
        fs::metadata(&self.dir).await.is_ok()
    }
}
