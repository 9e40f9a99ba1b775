use super::document_header;
use crate::model::File;
use crate::oracle::{CompileOracle, OracleError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

static TAGGED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(cmd|env):(\S+)[ \t\r]*$").expect("tagged line pattern must compile")
});

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification of {file} timed out after {budget:?}")]
    Timeout { file: String, budget: Duration },
    #[error("classification of {file} failed: {source}")]
    Oracle {
        file: String,
        #[source]
        source: OracleError,
    },
    #[error("candidate scan for {file} failed: {reason}")]
    Scan { file: String, reason: String },
}

impl ClassifyError {
    fn from_oracle(file: &File, err: OracleError) -> Self {
        match err {
            OracleError::Timeout(budget) => ClassifyError::Timeout {
                file: file.name.clone(),
                budget,
            },
            source => ClassifyError::Oracle {
                file: file.name.clone(),
                source,
            },
        }
    }
}

/// Candidates confirmed as defined after loading a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub commands: BTreeSet<String>,
    pub environments: BTreeSet<String>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.environments.is_empty()
    }
}

/// Asks the engine which candidate names are defined once a file is loaded,
/// and whether each one is a command or an environment.
///
/// A name counts as an environment when `end<name>` is defined as well.
pub struct SymbolClassifier {
    oracle: Arc<dyn CompileOracle>,
    budget: Duration,
}

impl SymbolClassifier {
    pub fn new(oracle: Arc<dyn CompileOracle>, budget: Duration) -> Self {
        Self { oracle, budget }
    }

    pub fn document(file: &File, candidates: &BTreeSet<String>) -> String {
        let mut code = document_header(file);
        code.push_str("\\makeatletter\n");
        code.push_str("\\begin{document}\n");
        for c in candidates {
            code.push_str(&format!(
                "\\@ifundefined{{{c}}}{{ }}{{\\@ifundefined{{end{c}}}{{\\wlog{{cmd:{c}}}}}{{\\wlog{{env:{c}}}}}}}\n"
            ));
        }
        code.push_str("\\end{document}\n");
        code
    }

    pub async fn classify(
        &self,
        file: &File,
        candidates: &BTreeSet<String>,
    ) -> Result<Classification, ClassifyError> {
        if candidates.is_empty() {
            debug!("No candidates left for {}, skipping compilation", file.name);
            return Ok(Classification::default());
        }

        let transcript = self
            .oracle
            .compile(
                &Self::document(file, candidates),
                file.format(),
                self.budget,
            )
            .await
            .map_err(|e| ClassifyError::from_oracle(file, e))?;

        Ok(parse_tagged(transcript.text()))
    }
}

/// Collects `cmd:<name>` and `env:<name>` lines. A name reported as an
/// environment is never also a command.
pub fn parse_tagged(text: &str) -> Classification {
    let mut result = Classification::default();
    for caps in TAGGED_LINE.captures_iter(text) {
        let name = caps[2].to_string();
        match &caps[1] {
            "env" => {
                result.environments.insert(name);
            }
            _ => {
                result.commands.insert(name);
            }
        }
    }
    result
        .commands
        .retain(|name| !result.environments.contains(name));
    result
}
