use crate::error::{Result, TexscopeError};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commands and environments built into the engine itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelPrimitives {
    #[serde(default)]
    pub commands: IndexSet<String>,
    #[serde(default)]
    pub environments: IndexSet<String>,
}

impl KernelPrimitives {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains(name) || self.environments.contains(name)
    }
}

/// Manually curated symbols for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub name: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub environments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub components: Vec<OverrideEntry>,
}

impl Overrides {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| TexscopeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
