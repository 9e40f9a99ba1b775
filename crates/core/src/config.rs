//! Run configuration, loadable from JSON with every field optional.

use crate::error::{Result, TexscopeError};
use crate::logging::default_log_dir;
use crate::probe::baseline_class_file;
use crate::scanner::DEFAULT_GRAMMAR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use texscope_ingest::{RuntimeConfig, types::default_parallelism};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub probe_timeout_ms: u64,
    pub classify_timeout_ms: u64,
    pub max_in_flight: usize,
    /// Run every probe one after another, in index order.
    pub sequential: bool,
    /// Files every probe document loads regardless of the target.
    pub baseline_files: Vec<String>,
    pub candidate_pattern: String,
    /// TEXMFDIST root; asked from kpathsea when unset.
    pub texmf_root: Option<PathBuf>,
    /// Directory holding the engine binaries; `PATH` lookup when unset.
    pub tex_bin_dir: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub kernel_path: Option<PathBuf>,
    pub overrides_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 10_000,
            classify_timeout_ms: 10_000,
            max_in_flight: default_parallelism(),
            sequential: false,
            baseline_files: vec![baseline_class_file()],
            candidate_pattern: DEFAULT_GRAMMAR.to_string(),
            texmf_root: None,
            tex_bin_dir: None,
            scratch_dir: None,
            kernel_path: None,
            overrides_path: None,
            log_dir: None,
        }
    }
}

impl IndexerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TexscopeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text)
            .map_err(|e| TexscopeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }

    pub fn runtime(&self) -> RuntimeConfig {
        if self.sequential {
            RuntimeConfig::sequential()
        } else {
            RuntimeConfig::parallel(self.max_in_flight)
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}
