//! Error types for the multimodal RAG assistant

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared by every crate in the workspace
#[derive(Error, Debug)]
pub enum Error {
    /// A single file failed during ingestion. The pass continues without it.
    #[error("Failed to ingest {source_name}: {reason}")]
    IngestionItem { source_name: String, reason: String },

    /// Neither query text nor query image was supplied.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A persisted index is missing or corrupt.
    #[error("Failed to load index {}: {reason}", path.display())]
    IndexLoad { path: PathBuf, reason: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Content could not be extracted or decoded (PDF text, image pixels).
    #[error("Decode error: {0}")]
    Decode(String),

    /// A malformed line from the generation backend.
    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Wrap any per-file failure as an ingestion item error
    pub fn ingestion_item(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::IngestionItem {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an index load error for the given file
    pub fn index_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::IndexLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
