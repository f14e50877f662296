use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Snapshot not found")]
    SnapshotNotFound,

    #[error("Snapshot corrupt: {0}")]
    SnapshotCorrupt(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// True for failures that reconciliation treats as "no recoverable
    /// history": the snapshot file is missing or does not parse. Callers
    /// on this path continue with an empty entry sequence.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SnapshotNotFound | Self::SnapshotCorrupt(_))
    }
}
