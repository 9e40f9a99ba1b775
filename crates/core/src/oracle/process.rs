use super::{CompileOracle, OracleError, Transcript};
use crate::model::Format;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const SOURCE_NAME: &str = "code.tex";
const LOG_NAME: &str = "code.log";

/// Runs the real engine, one process and one scratch directory per call.
#[derive(Debug, Clone, Default)]
pub struct TexCompiler {
    /// Directory holding the engine binaries; `PATH` lookup when unset.
    bin_dir: Option<PathBuf>,
    /// Parent for scratch directories; the system temp dir when unset.
    scratch_root: Option<PathBuf>,
}

impl TexCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bin_dir(mut self, bin_dir: Option<PathBuf>) -> Self {
        self.bin_dir = bin_dir;
        self
    }

    pub fn with_scratch_root(mut self, scratch_root: Option<PathBuf>) -> Self {
        self.scratch_root = scratch_root;
        self
    }

    fn program(&self, format: Format) -> PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(format.program()),
            None => PathBuf::from(format.program()),
        }
    }

    fn scratch_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("texscope-");
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }
}

#[async_trait]
impl CompileOracle for TexCompiler {
    async fn compile(
        &self,
        source: &str,
        format: Format,
        budget: Duration,
    ) -> Result<Transcript, OracleError> {
        let dir = self.scratch_dir()?;
        tokio::fs::write(dir.path().join(SOURCE_NAME), source).await?;

        let program = self.program(format);
        let mut child = Command::new(&program)
            .args(["-interaction=batchmode", "-shell-escape", SOURCE_NAME])
            .current_dir(dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OracleError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        match tokio::time::timeout(budget, child.wait()).await {
            Ok(status) => {
                // Batch mode exits non-zero on any TeX error; the log is still usable.
                let status = status?;
                debug!("{} exited with {}", program.display(), status);
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {} after {:?}: {}", program.display(), budget, e);
                }
                return Err(OracleError::Timeout(budget));
            }
        }

        let bytes = tokio::fs::read(dir.path().join(LOG_NAME)).await?;
        Ok(Transcript::new(String::from_utf8_lossy(&bytes).into_owned()))
    }
}
