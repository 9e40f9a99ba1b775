pub mod error;
pub mod runtime;
pub mod types;

pub use error::IngestError;
pub use runtime::{FlowControlConfig, FlowController, TaskPool};
pub use types::{ExecutionMode, RuntimeConfig};
