use super::FileIndex;
use crate::error::{Result, TexscopeError};
use crate::model::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Subtrees of TEXMFDIST that hold files loadable by the LaTeX engines.
pub const TEX_DIR_ROOTS: &[&str] = &[
    "tex/plain",
    "tex/generic",
    "tex/latex",
    "tex/luatex",
    "tex/lualatex",
    "tex/xetex",
    "tex/xelatex",
];

/// Builds a [`FileIndex`] from kpathsea's `ls-R` database.
pub struct LsRIndex;

impl LsRIndex {
    /// Asks kpathsea for the distribution root.
    pub fn texmf_dist_root() -> Result<PathBuf> {
        let output = Command::new("kpsewhich")
            .args(["--var-value", "TEXMFDIST"])
            .output()
            .map_err(|e| TexscopeError::Index(format!("failed to run kpsewhich: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| TexscopeError::Index("kpsewhich did not report TEXMFDIST".to_string()))
    }

    pub fn load(root: &Path) -> Result<FileIndex> {
        let db = root.join("ls-R");
        let text = std::fs::read_to_string(&db).map_err(|source| TexscopeError::Read {
            path: db.clone(),
            source,
        })?;
        let index = Self::parse(root, &text);
        info!("Loaded {} files from {}", index.len(), db.display());
        Ok(index)
    }

    pub fn parse(root: &Path, text: &str) -> FileIndex {
        let mut index = FileIndex::new();
        let mut current: Option<(PathBuf, bool)> = None;

        for line in text.lines() {
            if line.trim().is_empty() || line.starts_with('%') {
                continue;
            }

            if let Some(dir) = line.strip_suffix(':') {
                let relative = dir.trim_start_matches("./");
                let wanted = is_tex_dir(relative);
                current = Some((root.join(relative), wanted));
                continue;
            }

            let Some((dir, true)) = &current else {
                continue;
            };
            let path = dir.join(line);
            if path.extension().is_none() {
                continue;
            }
            if !index.insert(File::new(path)) {
                debug!("Duplicate file name {} ignored", line);
            }
        }

        index
    }
}

fn is_tex_dir(relative: &str) -> bool {
    TEX_DIR_ROOTS.iter().any(|root| {
        relative == *root
            || relative
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}
