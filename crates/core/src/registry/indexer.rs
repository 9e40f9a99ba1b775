use super::{ComponentRegistry, FileState};
use crate::config::IndexerConfig;
use crate::error::{Result, TexscopeError};
use crate::graph::GraphBuilder;
use crate::index::NameIndex;
use crate::model::{Component, Dependency, File, FileRole, KernelPrimitives, Overrides};
use crate::oracle::CompileOracle;
use crate::overrides::{OverrideError, apply_overrides};
use crate::probe::{ClassifyError, DependencyProbe, SymbolClassifier};
use crate::scanner::CandidateScanner;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use texscope_ingest::TaskPool;
use tracing::{debug, error, info, warn};

const PROGRESS_EVERY: usize = 100;

/// Summary of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    /// Classes and styles considered.
    pub files: usize,
    pub components: usize,
    /// Distinct files dependency-probed.
    pub probed: usize,
    pub skipped: Vec<String>,
}

/// Everything a component task needs to attribute symbols.
struct Attribution {
    kernel: Arc<KernelPrimitives>,
    scanner: CandidateScanner,
    classifier: SymbolClassifier,
    registry: Arc<ComponentRegistry>,
    /// Files every probe loads. They never appear as references but their
    /// symbols are upstream of every other component.
    baseline: Vec<String>,
}

impl Attribution {
    async fn resolve_component(
        self: Arc<Self>,
        members: Vec<Arc<Dependency>>,
    ) -> std::result::Result<Arc<Component>, ClassifyError> {
        let Some(lead) = members.first().map(|m| m.file.clone()) else {
            return Err(ClassifyError::Scan {
                file: String::new(),
                reason: "component has no members".to_string(),
            });
        };

        let outward = Component::from_members(&members, Vec::new(), Vec::new()).references;
        let resolved = self.registry.reachable(
            outward
                .iter()
                .chain(&self.baseline)
                .filter(|name| !members.iter().any(|m| m.name() == name.as_str()))
                .map(String::as_str),
        );

        let scan = {
            let this = Arc::clone(&self);
            let members = members.clone();
            tokio::task::spawn_blocking(move || {
                this.scanner.candidates(&members, &this.kernel, &resolved)
            })
        };
        let candidates = scan.await.map_err(|e| ClassifyError::Scan {
            file: lead.name.clone(),
            reason: e.to_string(),
        })?;
        debug!("{} candidates for {}", candidates.len(), lead.name);

        let classification = self.classifier.classify(&lead, &candidates).await?;
        for member in &members {
            self.registry.advance(member.name(), FileState::Classified);
        }

        let component = Arc::new(Component::from_members(
            &members,
            classification.commands,
            classification.environments,
        ));
        self.registry.register(Arc::clone(&component));
        Ok(component)
    }
}

/// Drives resolution: clusters each unresolved file's dependency closure,
/// then attributes symbols component by component, dependencies first.
pub struct Indexer {
    index: Arc<dyn NameIndex>,
    graph: GraphBuilder,
    attribution: Arc<Attribution>,
    pool: TaskPool,
}

pub struct IndexerBuilder {
    index: Arc<dyn NameIndex>,
    oracle: Arc<dyn CompileOracle>,
    kernel: KernelPrimitives,
    config: IndexerConfig,
    registry: Option<Arc<ComponentRegistry>>,
}

impl IndexerBuilder {
    pub fn kernel(mut self, kernel: KernelPrimitives) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn config(mut self, config: IndexerConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing registry instead of starting from an empty one.
    pub fn registry(mut self, registry: Arc<ComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Indexer> {
        let config = self.config;
        let scanner = CandidateScanner::new(&config.candidate_pattern).map_err(|e| {
            TexscopeError::Config(format!(
                "invalid candidate pattern {:?}: {}",
                config.candidate_pattern, e
            ))
        })?;
        let pool = TaskPool::new(&config.runtime());

        let probe = Arc::new(DependencyProbe::new(
            Arc::clone(&self.index),
            Arc::clone(&self.oracle),
            config.probe_timeout(),
            config.baseline_files.clone(),
        ));
        let attribution = Arc::new(Attribution {
            kernel: Arc::new(self.kernel),
            scanner,
            classifier: SymbolClassifier::new(self.oracle, config.classify_timeout()),
            registry: self.registry.unwrap_or_default(),
            baseline: probe.baseline().map(str::to_string).collect(),
        });

        Ok(Indexer {
            index: self.index,
            graph: GraphBuilder::new(probe, pool.clone()),
            attribution,
            pool,
        })
    }
}

impl Indexer {
    pub fn builder(index: Arc<dyn NameIndex>, oracle: Arc<dyn CompileOracle>) -> IndexerBuilder {
        IndexerBuilder {
            index,
            oracle,
            kernel: KernelPrimitives::default(),
            config: IndexerConfig::default(),
            registry: None,
        }
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.attribution.registry
    }

    pub fn kernel(&self) -> &KernelPrimitives {
        &self.attribution.kernel
    }

    /// The indexed file for `name`, or a path-less file when the index has none.
    pub fn lookup(&self, name: &str) -> File {
        self.index
            .lookup(name)
            .unwrap_or_else(|| File::unindexed(name))
    }

    /// Includes of `file`, probed at most once per run.
    pub async fn dependency(&self, file: File) -> Arc<Dependency> {
        self.graph.dependency(file).await
    }

    /// Every class and style the name index knows, in index order.
    pub fn targets(&self) -> Vec<File> {
        self.index.list(&[FileRole::Class, FileRole::Style])
    }

    pub async fn index_all(&self) -> IndexReport {
        self.index(self.targets()).await
    }

    pub async fn index(&self, files: Vec<File>) -> IndexReport {
        let started = Instant::now();
        let targets: Vec<File> = files.into_iter().filter(|f| f.role.is_component()).collect();
        let total = targets.len();
        info!("Indexing {} files", total);

        for (done, file) in targets.into_iter().enumerate() {
            if !self.registry().contains(&file.name) && !self.registry().is_settled(&file.name) {
                self.resolve(file).await;
            }
            if (done + 1) % PROGRESS_EVERY == 0 {
                info!("Indexed {}/{} files", done + 1, total);
            }
        }

        let report = IndexReport {
            files: total,
            components: self.registry().components().len(),
            probed: self.graph.probed(),
            skipped: self.registry().skipped(),
        };
        info!(
            "Indexing finished in {:?}: {} components, {} files probed, {} skipped",
            started.elapsed(),
            report.components,
            report.probed,
            report.skipped.len()
        );
        report
    }

    /// Resolves `file` together with every unresolved file it depends on.
    ///
    /// Returns the component `file` ended up in, or `None` when its
    /// classification failed in this run or an earlier one.
    pub async fn resolve(&self, file: File) -> Option<Arc<Component>> {
        self.resolve_baseline().await;
        self.resolve_closure(file).await
    }

    /// Resolves the baseline files before anything that could mention
    /// their symbols is classified.
    async fn resolve_baseline(&self) {
        for name in &self.attribution.baseline {
            if self.registry().is_settled(name) {
                continue;
            }
            match self.index.lookup(name) {
                Some(file) => {
                    debug!("Resolving baseline file {}", name);
                    self.resolve_closure(file).await;
                }
                None => debug!("Baseline file {} is not in the name index", name),
            }
        }
    }

    async fn resolve_closure(&self, file: File) -> Option<Arc<Component>> {
        let registry = self.registry();
        if let Some(known) = registry.get(&file.name) {
            return Some(known);
        }
        if registry.is_skipped(&file.name) {
            return None;
        }

        let name = file.name.clone();
        let clustering = self.graph.cluster(file, registry).await;
        for member in clustering.components.iter().flatten() {
            registry.advance(member.name(), FileState::DependenciesDiscovered);
            registry.advance(member.name(), FileState::Clustered);
        }
        debug!("{} resolves through {} components", name, clustering.len());

        for level in clustering.into_levels() {
            let names: Vec<Vec<String>> = level
                .iter()
                .map(|members| members.iter().map(|m| m.name().to_string()).collect())
                .collect();

            let attribution = Arc::clone(&self.attribution);
            let results = self
                .pool
                .run(level, move |members| {
                    Arc::clone(&attribution).resolve_component(members)
                })
                .await;

            for (names, result) in names.into_iter().zip(results) {
                match result {
                    Ok(Ok(component)) => {
                        debug!("Registered {}", component.file_names.join(", "));
                    }
                    Ok(Err(e)) => {
                        warn!("Could not analyze {}: {}", names.join(", "), e);
                        registry.skip(names.iter().map(String::as_str));
                    }
                    Err(e) => {
                        error!("Component task for {} failed: {}", names.join(", "), e);
                        registry.skip(names.iter().map(String::as_str));
                    }
                }
            }
        }

        registry.get(&name)
    }

    pub fn apply_overrides(&self, overrides: &Overrides) -> Vec<OverrideError> {
        apply_overrides(self.registry(), overrides)
    }

    /// Registered components followed by the kernel component.
    pub fn export(&self) -> Vec<Component> {
        let mut out: Vec<Component> = self
            .registry()
            .components()
            .iter()
            .map(|c| Component::clone(c))
            .collect();
        out.push(Component::kernel(self.kernel()));
        out
    }
}
