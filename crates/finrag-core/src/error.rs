use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Vector dimension {found} does not match store dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Ingestion batch mismatch: {documents} documents vs {embeddings} embeddings")]
    LengthMismatch { documents: usize, embeddings: usize },

    #[error("Document type {found} does not match store category {expected}")]
    DocTypeMismatch { expected: String, found: String },

    #[error("Unknown document type: {0}")]
    UnknownDocType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
