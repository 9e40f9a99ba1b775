//! The compilation engine, seen as an oracle that turns probe documents
//! into diagnostic transcripts.

use crate::model::Format;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod process;

pub use process::TexCompiler;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("compilation exceeded its budget of {0:?}")]
    Timeout(Duration),
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error during compilation: {0}")]
    Io(#[from] std::io::Error),
}

impl OracleError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, OracleError::Timeout(_))
    }
}

/// Diagnostic output of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[async_trait]
pub trait CompileOracle: Send + Sync {
    async fn compile(
        &self,
        source: &str,
        format: Format,
        budget: Duration,
    ) -> Result<Transcript, OracleError>;
}
