//! Manual corrections applied after automatic resolution.

use crate::model::{Component, Overrides};
use crate::registry::ComponentRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverrideError {
    #[error("override target {0} is not a registered component")]
    TargetMissing(String),
}

/// Finds the component an override entry names. A bare package name is
/// looked up as its `.sty` file.
fn target(registry: &ComponentRegistry, name: &str) -> Option<Arc<Component>> {
    registry.get(name).or_else(|| {
        if name.contains('.') {
            None
        } else {
            registry.get(&format!("{name}.sty"))
        }
    })
}

/// Extends registered components with curated symbols.
///
/// Components are never mutated in place: each entry produces a new
/// component that is rebound under all of its member names.
pub fn apply_overrides(registry: &ComponentRegistry, overrides: &Overrides) -> Vec<OverrideError> {
    let mut errors = Vec::new();
    for entry in &overrides.components {
        let Some(current) = target(registry, &entry.name) else {
            error!("Override target {} was never indexed", entry.name);
            errors.push(OverrideError::TargetMissing(entry.name.clone()));
            continue;
        };
        let updated = current.extended(&entry.commands, &entry.environments);
        registry.replace(Arc::new(updated));
    }
    info!(
        "Applied {} of {} overrides",
        overrides.components.len() - errors.len(),
        overrides.components.len()
    );
    errors
}
