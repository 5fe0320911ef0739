//! Error types for the recibo-sync library.

use recibo_core::AcquireError;
use thiserror::Error;

/// Errors from the receipt store.
///
/// A failed commit rolls the transaction back; in-memory and on-disk state
/// stay consistent with the last successful commit, so callers may retry.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Failed to run schema migrations.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Query or commit failure.
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    /// A row did not decode into a record.
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Errors from the remote receipt API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client construction failed.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Transport or decoding failure from the HTTP layer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors from a single ingestion attempt.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Document acquisition failed; no record was created.
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// Local persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An upload for this receipt is already in flight.
    #[error("upload already in flight for receipt {0}")]
    UploadInFlight(String),

    /// The acquisition task panicked or was cancelled.
    #[error("acquisition task failed: {0}")]
    Task(String),
}

/// Errors from sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
