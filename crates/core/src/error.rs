use std::path::PathBuf;
use thiserror::Error;

use crate::oracle::OracleError;

#[derive(Error, Debug)]
pub enum TexscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("name index error: {0}")]
    Index(String),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<texscope_ingest::IngestError> for TexscopeError {
    fn from(err: texscope_ingest::IngestError) -> Self {
        TexscopeError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TexscopeError>;
