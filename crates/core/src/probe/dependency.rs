use super::{baseline_class_file, document_header};
use crate::index::NameIndex;
use crate::model::{Dependency, File};
use crate::oracle::{CompileOracle, OracleError};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Header `\listfiles` prints before the loaded-file table.
pub const FILE_LIST_MARKER: &str = "*File List*";

static FILE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\s]+\.(?:sty|tex|def|cls)").expect("file token pattern must compile")
});

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("dependency probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("transcript has no `{FILE_LIST_MARKER}` section")]
    MarkerMissing,
    #[error("dependency probe failed: {0}")]
    Oracle(OracleError),
}

impl From<OracleError> for ProbeError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Timeout(budget) => ProbeError::Timeout(budget),
            other => ProbeError::Oracle(other),
        }
    }
}

/// Finds out which files a class or package loads.
pub struct DependencyProbe {
    index: Arc<dyn NameIndex>,
    oracle: Arc<dyn CompileOracle>,
    budget: Duration,
    baseline: IndexSet<String>,
}

impl DependencyProbe {
    /// `baseline` names files every probe document loads on top of the
    /// host class, which is always part of it.
    pub fn new(
        index: Arc<dyn NameIndex>,
        oracle: Arc<dyn CompileOracle>,
        budget: Duration,
        baseline: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut files = IndexSet::new();
        files.insert(baseline_class_file());
        files.extend(baseline);
        Self {
            index,
            oracle,
            budget,
            baseline: files,
        }
    }

    /// Files excluded from every include list, host class first.
    pub fn baseline(&self) -> impl Iterator<Item = &str> {
        self.baseline.iter().map(String::as_str)
    }

    pub fn document(file: &File) -> String {
        let mut code = document_header(file);
        code.push_str("\\listfiles\n");
        code.push_str("\\begin{document}\n");
        code.push_str("\\end{document}\n");
        code
    }

    /// Files loaded by `file`, in load order, without `file` itself and
    /// without the baseline files every probe loads.
    pub async fn discover(&self, file: &File) -> Result<Vec<File>, ProbeError> {
        let transcript = self
            .oracle
            .compile(&Self::document(file), file.format(), self.budget)
            .await?;
        let names = parse_file_list(transcript.text()).ok_or(ProbeError::MarkerMissing)?;

        Ok(names
            .into_iter()
            .filter(|name| *name != file.name && !self.baseline.contains(name))
            .map(|name| match self.index.lookup(&name) {
                Some(found) => found,
                None => {
                    debug!("{} is not in the name index, probing it standalone", name);
                    File::unindexed(name)
                }
            })
            .collect())
    }

    /// Like [`discover`](Self::discover), but a failed probe degrades to a
    /// dependency without includes instead of an error.
    pub async fn probe(&self, file: File) -> Dependency {
        match self.discover(&file).await {
            Ok(includes) => Dependency::new(file, includes),
            Err(e) => {
                warn!("Could not list dependencies of {}: {}", file, e);
                Dependency::degraded(file, e.to_string())
            }
        }
    }
}

/// File names listed after [`FILE_LIST_MARKER`], deduplicated in order.
///
/// Returns `None` when the marker is absent. The table ends at the first
/// line made only of asterisks.
pub fn parse_file_list(text: &str) -> Option<Vec<String>> {
    let start = text.find(FILE_LIST_MARKER)? + FILE_LIST_MARKER.len();

    let mut names = IndexSet::new();
    for line in text[start..].lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '*') {
            break;
        }
        for token in FILE_TOKEN.find_iter(line) {
            names.insert(token.as_str().to_string());
        }
    }
    Some(names.into_iter().collect())
}
