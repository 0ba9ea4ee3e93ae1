use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vector store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: lancedb::Error,
    },

    #[error("collection {0:?} not found (no rebuild has run against this store)")]
    CollectionNotFound(String),

    #[error("embedding dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding model mismatch: index built with {indexed:?}, queried with {current:?}")]
    ModelMismatch { indexed: String, current: String },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("lancedb error: {0}")]
    Lance(lancedb::Error),

    #[error("{0}")]
    Other(String),
}

// TableNotFound surfaces as CollectionNotFound so callers can distinguish
// "never built" from backend failures.
impl From<lancedb::Error> for StoreError {
    fn from(e: lancedb::Error) -> Self {
        match e {
            lancedb::Error::TableNotFound { name, .. } => Self::CollectionNotFound(name),
            e => Self::Lance(e),
        }
    }
}
