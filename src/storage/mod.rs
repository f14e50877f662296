pub mod cache;
pub mod codec;
pub mod table;

pub use cache::SnapshotCache;
pub use codec::SnapshotCodec;
pub use table::Table;

use std::path::PathBuf;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory snapshot files are written under.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Deterministic identity-to-file mapping: same identity, same file.
    /// Identity choice (and collision avoidance) belongs to the caller.
    pub fn snapshot_path(&self, identity: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", identity))
    }
}
