//! Working dependency graph discovery and clustering.

use crate::model::{Dependency, File};
use crate::probe::DependencyProbe;
use crate::registry::ComponentRegistry;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use texscope_ingest::TaskPool;
use tracing::{debug, warn};

pub mod scc;

pub use scc::{levels, strongly_connected};

/// Dependencies probed during this run, keyed by file name.
pub type ProbeMemo = DashMap<String, Arc<Dependency>>;

/// Strongly connected components of a working graph, dependency-first.
#[derive(Debug, Default)]
pub struct Clustering {
    /// Members of each component, sorted by file name.
    pub components: Vec<Vec<Arc<Dependency>>>,
    /// Scheduling level of each entry in `components`.
    pub levels: Vec<usize>,
}

impl Clustering {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components grouped by level, lowest level first. Components in one
    /// group never reference each other.
    pub fn into_levels(self) -> Vec<Vec<Vec<Arc<Dependency>>>> {
        let depth = self.levels.iter().max().map_or(0, |top| top + 1);
        let mut grouped: Vec<Vec<Vec<Arc<Dependency>>>> = (0..depth).map(|_| Vec::new()).collect();
        for (members, level) in self.components.into_iter().zip(self.levels) {
            grouped[level].push(members);
        }
        grouped
    }
}

/// Discovers the unresolved part of the dependency graph below an entry file
/// and partitions it into strongly connected components.
pub struct GraphBuilder {
    probe: Arc<DependencyProbe>,
    pool: TaskPool,
    memo: Arc<ProbeMemo>,
}

impl GraphBuilder {
    pub fn new(probe: Arc<DependencyProbe>, pool: TaskPool) -> Self {
        Self {
            probe,
            pool,
            memo: Arc::new(ProbeMemo::new()),
        }
    }

    /// Number of distinct files probed so far.
    pub fn probed(&self) -> usize {
        self.memo.len()
    }

    /// Dependency of a single file, probing it only if this run has not yet.
    pub async fn dependency(&self, file: File) -> Arc<Dependency> {
        if let Some(known) = self.memo.get(&file.name) {
            return Arc::clone(known.value());
        }
        let dep = Arc::new(self.probe.probe(file).await);
        Arc::clone(self.memo.entry(dep.name().to_string()).or_insert(dep).value())
    }

    pub async fn cluster(&self, entry: File, registry: &ComponentRegistry) -> Clustering {
        let nodes = self.discover_closure(entry, registry).await;

        let adjacency: IndexMap<String, Vec<String>> = nodes
            .iter()
            .map(|(name, dep)| {
                let targets = dep
                    .references()
                    .into_iter()
                    .filter(|r| nodes.contains_key(&r.name))
                    .map(|r| r.name.clone())
                    .collect();
                (name.clone(), targets)
            })
            .collect();

        let sccs = strongly_connected(&adjacency);
        let levels = levels(&adjacency, &sccs);
        let components = sccs
            .into_iter()
            .map(|names| {
                let mut members: Vec<Arc<Dependency>> =
                    names.iter().filter_map(|n| nodes.get(n).cloned()).collect();
                members.sort_by(|a, b| a.name().cmp(b.name()));
                members
            })
            .collect();

        Clustering { components, levels }
    }

    /// Breadth-first closure of `entry` over references that still need work.
    async fn discover_closure(
        &self,
        entry: File,
        registry: &ComponentRegistry,
    ) -> IndexMap<String, Arc<Dependency>> {
        let mut nodes: IndexMap<String, Arc<Dependency>> = IndexMap::new();
        let mut frontier = vec![entry];

        while !frontier.is_empty() {
            debug!("Probing wave of {} files", frontier.len());
            let wave = self.probe_wave(frontier).await;
            for dep in &wave {
                nodes.insert(dep.name().to_string(), Arc::clone(dep));
            }

            let mut queued = HashSet::new();
            let mut next = Vec::new();
            for dep in &wave {
                for reference in dep.references() {
                    let name = reference.name.as_str();
                    if nodes.contains_key(name)
                        || registry.contains(name)
                        || registry.is_settled(name)
                        || !queued.insert(name)
                    {
                        continue;
                    }
                    next.push(reference.clone());
                }
            }
            frontier = next;
        }

        nodes
    }

    /// Probes every file not yet in the memo concurrently. Results follow
    /// the order of `files`.
    async fn probe_wave(&self, files: Vec<File>) -> Vec<Arc<Dependency>> {
        let pending: Vec<File> = files
            .iter()
            .filter(|f| !self.memo.contains_key(&f.name))
            .cloned()
            .collect();

        if !pending.is_empty() {
            let probe = Arc::clone(&self.probe);
            let results = self
                .pool
                .run(pending.clone(), move |file| {
                    let probe = Arc::clone(&probe);
                    async move { probe.probe(file).await }
                })
                .await;

            for (file, result) in pending.into_iter().zip(results) {
                let dep = match result {
                    Ok(dep) => dep,
                    Err(e) => {
                        warn!("Probe task for {} failed: {}", file, e);
                        Dependency::degraded(file, e.to_string())
                    }
                };
                self.memo
                    .entry(dep.name().to_string())
                    .or_insert_with(|| Arc::new(dep));
            }
        }

        files
            .iter()
            .filter_map(|f| self.memo.get(&f.name).map(|entry| Arc::clone(entry.value())))
            .collect()
    }
}
