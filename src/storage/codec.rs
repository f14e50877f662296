//! Snapshot codec: translates between the on-disk JSON form and the
//! in-memory entry sequence, and performs the file-system side effects.

use crate::core::{Entry, Result, StoreError};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Reads and writes one store's snapshot file: a JSON array of
/// `{"key": ..., "value": ...}` records, insertion-ordered.
///
/// `store` rewrites the file in full (replace, not append) and is atomic
/// with respect to a single writer: the sequence is written to a `.tmp`
/// sibling, synced, and renamed over the snapshot, so a concurrent `load`
/// never observes a partial write.
pub struct SnapshotCodec {
    path: PathBuf,
}

impl SnapshotCodec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the snapshot. Fails with `SnapshotNotFound` when
    /// the file does not exist and `SnapshotCorrupt` when it exists but
    /// does not parse as an entry sequence; both mean "no recoverable
    /// history" to reconciliation.
    pub async fn load(&self) -> Result<Vec<Entry>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::SnapshotNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_slice(&bytes).map_err(|err| StoreError::SnapshotCorrupt(err.to_string()))
    }

    /// Serializes the full entry sequence and replaces the snapshot file.
    pub async fn store(&self, entries: &[Entry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec(entries)
            .map_err(|err| StoreError::SnapshotCorrupt(err.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Deletes the snapshot file. Removing a nonexistent file succeeds.
    pub async fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_load_round_trip() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let codec = SnapshotCodec::new(dir.path().join("store.json"));

            let entries = vec![
                Entry::new("name", "Alice"),
                Entry::new(7, Value::Array(vec![Value::Integer(1)])),
            ];
            codec.store(&entries).await.unwrap();

            let loaded = codec.load().await.unwrap();
            assert_eq!(loaded, entries);
        });
    }

    #[test]
    fn test_load_missing_file() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let codec = SnapshotCodec::new(dir.path().join("missing.json"));

            assert!(matches!(
                codec.load().await,
                Err(StoreError::SnapshotNotFound)
            ));
        });
    }

    #[test]
    fn test_load_corrupt_file() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("broken.json");
            std::fs::write(&path, b"{not json").unwrap();

            let codec = SnapshotCodec::new(&path);
            assert!(matches!(
                codec.load().await,
                Err(StoreError::SnapshotCorrupt(_))
            ));
        });
    }

    #[test]
    fn test_store_replaces_prior_content() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let codec = SnapshotCodec::new(dir.path().join("store.json"));

            codec
                .store(&[Entry::new("a", 1), Entry::new("b", 2)])
                .await
                .unwrap();
            codec.store(&[Entry::new("a", 1)]).await.unwrap();

            let loaded = codec.load().await.unwrap();
            assert_eq!(loaded, vec![Entry::new("a", 1)]);
            // The tmp sibling must not survive a successful store
            assert!(!dir.path().join("store.tmp").exists());
        });
    }

    #[test]
    fn test_remove_is_idempotent() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let codec = SnapshotCodec::new(dir.path().join("store.json"));

            codec.store(&[Entry::new("a", 1)]).await.unwrap();
            codec.remove().await.unwrap();
            codec.remove().await.unwrap();

            assert!(matches!(
                codec.load().await,
                Err(StoreError::SnapshotNotFound)
            ));
        });
    }
}
