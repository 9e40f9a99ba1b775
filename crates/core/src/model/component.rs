use super::dependency::Dependency;
use super::primitives::KernelPrimitives;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Unit of symbol attribution: one file, or a strongly connected group of
/// files that include each other.
///
/// Serialized in camelCase for the database assembly stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub file_names: Vec<String>,
    pub references: Vec<String>,
    pub commands: IndexSet<String>,
    pub environments: IndexSet<String>,
}

impl Component {
    /// Builds a component from the members of one SCC.
    ///
    /// File names are sorted so the result does not depend on which member
    /// the traversal entered through. References only keep edges that leave
    /// the member set.
    pub fn from_members(
        members: &[Arc<Dependency>],
        commands: impl IntoIterator<Item = String>,
        environments: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut file_names: Vec<String> = members.iter().map(|d| d.name().to_string()).collect();
        file_names.sort();
        file_names.dedup();

        let inside: HashSet<&str> = file_names.iter().map(String::as_str).collect();
        let mut references: IndexSet<String> = IndexSet::new();
        for member in members {
            for reference in member.references() {
                if !inside.contains(reference.name.as_str()) {
                    references.insert(reference.name.clone());
                }
            }
        }

        Self {
            file_names,
            references: references.into_iter().collect(),
            commands: commands.into_iter().collect(),
            environments: environments.into_iter().collect(),
        }
    }

    /// The engine's built-in symbols, emitted as a component without files.
    pub fn kernel(kernel: &KernelPrimitives) -> Self {
        Self {
            file_names: Vec::new(),
            references: Vec::new(),
            commands: kernel.commands.clone(),
            environments: kernel.environments.clone(),
        }
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.file_names.iter().any(|n| n == name)
    }

    pub fn defines(&self, symbol: &str) -> bool {
        self.commands.contains(symbol) || self.environments.contains(symbol)
    }

    /// Copy of this component with extra symbols appended after the existing ones.
    pub fn extended(&self, commands: &[String], environments: &[String]) -> Self {
        let mut next = self.clone();
        next.commands.extend(commands.iter().cloned());
        next.environments.extend(environments.iter().cloned());
        next
    }
}
