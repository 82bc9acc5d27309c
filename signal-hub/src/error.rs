//! Error taxonomy for ingestion and dashboard reads.
//!
//! `ValidationError` is client-fixable, `StorageError` is surfaced to the caller,
//! and `CacheError` never fails a read on its own.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no data provided")]
    NotAnObject,

    #[error("missing symbol field")]
    MissingSymbol,

    #[error("missing reason")]
    MissingReason,

    /// `reason` was sent but is not text
    #[error("reason must be a string")]
    InvalidReason,

    #[error("capital_deployed_cr must be a number")]
    InvalidCapital,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("corrupt signal row: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache payload codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Failure of a single ingestion request
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
