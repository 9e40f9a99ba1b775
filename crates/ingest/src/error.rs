use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("execution failed: {0}")]
    Execution(String),
}
