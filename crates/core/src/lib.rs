pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod logging;
pub mod model;
pub mod oracle;
pub mod overrides;
pub mod probe;
pub mod registry;
pub mod scanner;

pub use config::IndexerConfig;
pub use error::{Result, TexscopeError};
pub use registry::{ComponentRegistry, FileState, IndexReport, Indexer};
