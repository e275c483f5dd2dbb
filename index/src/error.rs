use thiserror::Error;

use explorer_store::{PageError, StoreError};

/// Failure inside one reference index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid pagination: {0}")]
    InvalidPagination(#[from] PageError),

    #[error("index storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("index document codec error: {0}")]
    Codec(String),
}

impl From<bincode::Error> for IndexError {
    fn from(e: bincode::Error) -> Self {
        IndexError::Codec(e.to_string())
    }
}

/// Failure of a write through [`crate::IndexedStore`].
///
/// The variants tell apart "nothing was persisted" from "the base store
/// committed but the indices may be stale".
#[derive(Debug, Error)]
pub enum IndexedStoreError {
    #[error("base store write failed: {0}")]
    BaseWrite(#[source] StoreError),

    #[error("base store read failed: {0}")]
    BaseRead(#[source] StoreError),

    #[error("{subject} is committed to the base store but indexing failed: {source}")]
    IndexWrite {
        subject: String,
        #[source]
        source: IndexError,
    },
}

impl IndexedStoreError {
    /// Whether the base write went through. A committed write must not be
    /// retried wholesale; rebuild the indices instead.
    pub fn is_committed(&self) -> bool {
        matches!(self, IndexedStoreError::IndexWrite { .. })
    }
}
