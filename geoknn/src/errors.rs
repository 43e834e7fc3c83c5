//! Error types for the KNN query engine.
//!
//! Errors here surface only across the host-engine seam. The query surface
//! itself never raises: resolution failures and malformed arguments degrade
//! to empty row sequences, and per-candidate failures degrade to the
//! infinity distance sentinel.

use std::io;
use thiserror::Error;

/// Errors that can occur when talking to the host spatial engine.
#[derive(Debug, Error)]
pub enum KnnError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

/// Result type for engine-facing operations.
pub type KnnResult<T> = Result<T, KnnError>;
