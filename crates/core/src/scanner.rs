//! Candidate symbol extraction from raw source text.

use crate::model::{Component, Dependency, File, KernelPrimitives};
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Identifier grammar used when none is configured.
pub const DEFAULT_GRAMMAR: &str = "[a-zA-Z]+";

/// Over-approximates the names a component could define.
///
/// Every identifier-shaped token in the member sources and their includes is
/// a candidate, minus what the kernel or an already resolved component owns.
#[derive(Debug, Clone)]
pub struct CandidateScanner {
    grammar: Regex,
}

impl Default for CandidateScanner {
    fn default() -> Self {
        Self {
            grammar: Regex::new(DEFAULT_GRAMMAR).expect("default grammar must compile"),
        }
    }
}

impl CandidateScanner {
    pub fn new(grammar: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            grammar: Regex::new(grammar)?,
        })
    }

    pub fn tokenize(&self, text: &str) -> BTreeSet<String> {
        tokenize(&self.grammar, text)
    }

    pub fn candidates(
        &self,
        members: &[Arc<Dependency>],
        kernel: &KernelPrimitives,
        resolved_refs: &[Arc<Component>],
    ) -> BTreeSet<String> {
        let mut seen = HashSet::new();
        let sources: Vec<&File> = members
            .iter()
            .flat_map(|m| m.includes.iter())
            .filter(|f| seen.insert(f.name.as_str()))
            .collect();

        let mut tokens = sources
            .par_iter()
            .map(|file| match file.read_source() {
                Ok(text) => self.tokenize(&text),
                Err(e) => {
                    debug!("Skipping source of {}: {}", file.name, e);
                    BTreeSet::new()
                }
            })
            .reduce(BTreeSet::new, |mut acc, part| {
                acc.extend(part);
                acc
            });

        tokens.retain(|t| {
            !kernel.contains(t) && !resolved_refs.iter().any(|component| component.defines(t))
        });
        tokens
    }
}

/// Every distinct match of `grammar` in `text`.
pub fn tokenize(grammar: &Regex, text: &str) -> BTreeSet<String> {
    grammar
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
