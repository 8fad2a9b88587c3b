use models::{errors::ModelError, StorageKey};
use thiserror::Error;

/// Failures surfaced by the datastore and entity stores. Nothing here is
/// retried or recovered inside the store; callers decide.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(StorageKey),
    #[error("bad cursor: {0}")]
    BadCursor(String),
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
    #[error("identifier generation failed: {0}")]
    IdentifierGeneration(String),
    #[error("cannot decode record at {key}: {reason}")]
    Codec { key: StorageKey, reason: String },
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl StoreError {
    pub fn unavailable(e: impl std::fmt::Display) -> Self {
        Self::Unavailable(e.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
