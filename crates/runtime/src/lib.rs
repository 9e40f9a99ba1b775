use std::path::Path;
use std::sync::Arc;
use texscope_core::config::IndexerConfig;
use texscope_core::index::LsRIndex;
use texscope_core::model::{KernelPrimitives, Overrides};
use texscope_core::oracle::TexCompiler;
use texscope_core::{Indexer, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// Reads `path` when given, otherwise starts from the defaults.
pub fn load_config(path: Option<&Path>) -> Result<IndexerConfig> {
    match path {
        Some(path) => IndexerConfig::load(path),
        None => Ok(IndexerConfig::default()),
    }
}

/// Assembles an indexer bound to the installed TeX distribution.
///
/// The name index comes from the distribution's `ls-R` database and every
/// probe runs the real engine in a scratch directory.
pub fn build_default_indexer(config: IndexerConfig) -> Result<Indexer> {
    let root = match &config.texmf_root {
        Some(root) => root.clone(),
        None => LsRIndex::texmf_dist_root()?,
    };
    info!("Using TeX tree at {}", root.display());
    let index = Arc::new(LsRIndex::load(&root)?);

    let kernel = match &config.kernel_path {
        Some(path) => KernelPrimitives::load(path)?,
        None => {
            warn!("No kernel primitives configured, engine built-ins will be attributed to packages");
            KernelPrimitives::default()
        }
    };

    let compiler = TexCompiler::new()
        .with_bin_dir(config.tex_bin_dir.clone())
        .with_scratch_root(config.scratch_dir.clone());

    Indexer::builder(index, Arc::new(compiler))
        .kernel(kernel)
        .config(config)
        .build()
}

/// Curated corrections named by the configuration, or none.
pub fn load_overrides(config: &IndexerConfig) -> Result<Overrides> {
    match &config.overrides_path {
        Some(path) => Overrides::load(path),
        None => Ok(Overrides::default()),
    }
}

/// Initializes logging for a component, writing under the configured log directory.
pub fn init_logging(component: &str, config: &IndexerConfig, to_stderr: bool) -> WorkerGuard {
    texscope_core::logging::init_logging(component, &config.log_dir(), to_stderr)
}
