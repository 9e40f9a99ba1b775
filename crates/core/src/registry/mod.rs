//! Resolved components, keyed by every member file name.

use crate::model::Component;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

pub mod indexer;

pub use indexer::{IndexReport, Indexer, IndexerBuilder};

/// Lifecycle of one file during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileState {
    Unresolved,
    DependenciesDiscovered,
    Clustered,
    Classified,
    Registered,
    /// Classification failed; the file is not retried in this run.
    Skipped,
}

impl FileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileState::Registered | FileState::Skipped)
    }

    fn rank(self) -> u8 {
        match self {
            FileState::Unresolved => 0,
            FileState::DependenciesDiscovered => 1,
            FileState::Clustered => 2,
            FileState::Classified => 3,
            FileState::Registered | FileState::Skipped => 4,
        }
    }

    fn can_move_to(self, next: FileState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Concurrent map from file name to the component that file belongs to.
///
/// All members of one component share a single `Arc`, so a lookup through
/// any member yields the same value.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: DashMap<String, Arc<Component>>,
    states: DashMap<String, FileState>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Component>> {
        self.components.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.state(name) == FileState::Skipped
    }

    /// Registered or skipped: nothing left to do for this name.
    pub fn is_settled(&self, name: &str) -> bool {
        self.state(name).is_terminal()
    }

    pub fn state(&self, name: &str) -> FileState {
        self.states
            .get(name)
            .map(|entry| *entry.value())
            .unwrap_or(FileState::Unresolved)
    }

    /// Moves `name` forward in its lifecycle. Backward moves and moves out
    /// of a terminal state are ignored.
    pub fn advance(&self, name: &str, next: FileState) {
        self.states
            .entry(name.to_string())
            .and_modify(|state| {
                if state.can_move_to(next) {
                    *state = next;
                }
            })
            .or_insert(next);
    }

    /// Inserts `component` under each of its file names and marks them registered.
    pub fn register(&self, component: Arc<Component>) {
        self.replace(Arc::clone(&component));
        for name in &component.file_names {
            self.advance(name, FileState::Registered);
        }
    }

    /// Rebinds every member name to `component` without touching file states.
    pub fn replace(&self, component: Arc<Component>) {
        for name in &component.file_names {
            self.components.insert(name.clone(), Arc::clone(&component));
        }
    }

    pub fn skip<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.advance(name, FileState::Skipped);
        }
    }

    /// Number of file names bound to a component.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn skipped(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .states
            .iter()
            .filter(|entry| *entry.value() == FileState::Skipped)
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Distinct components, ordered by their first file name.
    pub fn components(&self) -> Vec<Arc<Component>> {
        let mut seen = HashSet::new();
        let mut out: Vec<Arc<Component>> = self
            .components
            .iter()
            .filter(|entry| seen.insert(Arc::as_ptr(entry.value())))
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        out.sort_by(|a, b| a.file_names.cmp(&b.file_names));
        out
    }

    /// Registered components reachable from `roots` through references,
    /// including the components the roots themselves belong to. Names that
    /// are not registered end the walk along that path.
    pub fn reachable<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> Vec<Arc<Component>> {
        let mut visited: HashSet<*const Component> = HashSet::new();
        let mut out = Vec::new();
        let mut queue: VecDeque<String> = roots.into_iter().map(str::to_string).collect();

        while let Some(name) = queue.pop_front() {
            let Some(component) = self.get(&name) else {
                continue;
            };
            if !visited.insert(Arc::as_ptr(&component)) {
                continue;
            }
            queue.extend(component.references.iter().cloned());
            out.push(component);
        }
        out
    }
}
