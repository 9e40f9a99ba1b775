use super::source::File;
use std::collections::HashSet;

/// How the include list of a [`Dependency`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Discovered,
    /// The probe failed; the file is treated as having no dependencies.
    Degraded(String),
}

/// A file together with every file that gets loaded when it is compiled.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub file: File,
    /// Loaded files in transcript order, starting with `file` itself.
    pub includes: Vec<File>,
    pub outcome: ProbeOutcome,
}

impl Dependency {
    pub fn new(file: File, discovered: Vec<File>) -> Self {
        let mut includes = Vec::with_capacity(discovered.len() + 1);
        includes.push(file.clone());
        includes.extend(discovered.into_iter().filter(|f| *f != file));
        Self {
            file,
            includes,
            outcome: ProbeOutcome::Discovered,
        }
    }

    pub fn degraded(file: File, reason: impl Into<String>) -> Self {
        Self {
            includes: vec![file.clone()],
            file,
            outcome: ProbeOutcome::Degraded(reason.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Degraded(_))
    }

    /// Included classes and styles other than the file itself, without duplicates.
    pub fn references(&self) -> Vec<&File> {
        let mut seen = HashSet::new();
        self.includes
            .iter()
            .filter(|inc| **inc != self.file && inc.role.is_component())
            .filter(|inc| seen.insert(inc.name.as_str()))
            .collect()
    }
}
