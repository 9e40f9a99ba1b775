//! A miniature TeX installation and an engine that "compiles" probe
//! documents against it.
//!
//! Sources use a tiny subset of LaTeX: `\RequirePackage{x}` loads `x.sty`,
//! `\LoadClass{x}` loads `x.cls`, `\newcommand{\x}` and `\def\x` define a
//! command, `\newenvironment{x}` defines `x` and `endx`.

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use texscope_core::config::IndexerConfig;
use texscope_core::index::FileIndex;
use texscope_core::model::{File, Format, KernelPrimitives};
use texscope_core::oracle::{CompileOracle, OracleError, Transcript};
use texscope_core::registry::Indexer;

static REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(RequirePackage|LoadClass)\{([^}]+)\}").unwrap());
static COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:newcommand\{?|def)\\([a-zA-Z]+)").unwrap());
static ENVIRONMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\newenvironment\{([a-zA-Z]+)\}").unwrap());
static DOCUMENT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\documentclass\{([^}]+)\}").unwrap());
static USE_PACKAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\usepackage\{([^}]+)\}").unwrap());
static CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\@ifundefined\{([^}]+)\}\{ \}").unwrap());

pub const KERNEL_COMMANDS: &[&str] = &[
    "newcommand",
    "def",
    "newenvironment",
    "RequirePackage",
    "LoadClass",
    "ProvidesPackage",
    "ProvidesClass",
    "relax",
];

#[allow(dead_code)]
pub fn kernel() -> KernelPrimitives {
    KernelPrimitives {
        commands: KERNEL_COMMANDS.iter().map(|s| s.to_string()).collect(),
        environments: ["document"].into_iter().map(String::from).collect(),
    }
}

/// Files on disk plus the name index that knows them.
pub struct Universe {
    dir: TempDir,
    index: FileIndex,
    sources: HashMap<String, String>,
}

#[allow(dead_code)]
impl Universe {
    pub fn new() -> Self {
        let mut universe = Self {
            dir: tempfile::tempdir().unwrap(),
            index: FileIndex::new(),
            sources: HashMap::new(),
        };
        universe.add(
            "article.cls",
            "\\ProvidesClass{article}\n\\newcommand{\\section}{}\n\\def\\maketitle{}\n",
        );
        universe
    }

    pub fn with(files: &[(&str, &str)]) -> Self {
        let mut universe = Self::new();
        for (name, source) in files {
            universe.add(name, source);
        }
        universe
    }

    pub fn add(&mut self, name: &str, source: &str) -> File {
        let file = self.add_unindexed(name, source);
        self.index.insert(file.clone());
        file
    }

    /// A file the engine can load but the name index does not list.
    pub fn add_unindexed(&mut self, name: &str, source: &str) -> File {
        let path: PathBuf = self.dir.path().join(name);
        std::fs::write(&path, source).unwrap();
        self.sources.insert(name.to_string(), source.to_string());
        File::new(path)
    }

    pub fn file(&self, name: &str) -> File {
        use texscope_core::index::NameIndex;
        self.index.lookup(name).unwrap()
    }

    pub fn engine(&self) -> SimulatedEngine {
        SimulatedEngine {
            sources: self.sources.clone(),
            kernel: KERNEL_COMMANDS.iter().map(|s| s.to_string()).collect(),
            stalled_listings: HashSet::new(),
            stalled_classifications: HashSet::new(),
            listings: DashMap::new(),
            classifications: DashMap::new(),
        }
    }

    pub fn indexer(&self, engine: Arc<SimulatedEngine>, sequential: bool) -> Indexer {
        let config = IndexerConfig {
            probe_timeout_ms: 200,
            classify_timeout_ms: 200,
            max_in_flight: 4,
            sequential,
            ..Default::default()
        };
        Indexer::builder(Arc::new(self.index.clone()), engine)
            .kernel(kernel())
            .config(config)
            .build()
            .unwrap()
    }
}

/// Interprets the two probe document shapes against the universe sources.
pub struct SimulatedEngine {
    sources: HashMap<String, String>,
    kernel: HashSet<String>,
    stalled_listings: HashSet<String>,
    stalled_classifications: HashSet<String>,
    listings: DashMap<String, usize>,
    classifications: DashMap<String, usize>,
}

#[allow(dead_code)]
impl SimulatedEngine {
    /// Dependency probes of `name` exceed their budget.
    pub fn stall_listing(mut self, name: &str) -> Self {
        self.stalled_listings.insert(name.to_string());
        self
    }

    /// Classification probes of `name` exceed their budget.
    pub fn stall_classification(mut self, name: &str) -> Self {
        self.stalled_classifications.insert(name.to_string());
        self
    }

    pub fn listings_of(&self, name: &str) -> usize {
        self.listings.get(name).map(|c| *c).unwrap_or(0)
    }

    pub fn classifications_of(&self, name: &str) -> usize {
        self.classifications.get(name).map(|c| *c).unwrap_or(0)
    }

    pub fn listing_counts(&self) -> HashMap<String, usize> {
        self.listings
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    fn target(source: &str) -> Option<String> {
        if let Some(pkg) = USE_PACKAGE.captures(source) {
            return Some(format!("{}.sty", &pkg[1]));
        }
        DOCUMENT_CLASS
            .captures(source)
            .map(|cls| format!("{}.cls", &cls[1]))
    }

    /// Load order of every file pulled in by the document, or the name of
    /// the first file that could not be found.
    fn load_order(&self, source: &str) -> Result<Vec<String>, String> {
        let mut order = Vec::new();
        let mut roots = Vec::new();
        if let Some(cls) = DOCUMENT_CLASS.captures(source) {
            roots.push(format!("{}.cls", &cls[1]));
        }
        if let Some(pkg) = USE_PACKAGE.captures(source) {
            roots.push(format!("{}.sty", &pkg[1]));
        }
        for root in roots {
            self.load(&root, &mut order)?;
        }
        Ok(order)
    }

    fn load(&self, name: &str, order: &mut Vec<String>) -> Result<(), String> {
        if order.iter().any(|n| n == name) {
            return Ok(());
        }
        let source = self.sources.get(name).ok_or_else(|| name.to_string())?;
        order.push(name.to_string());
        for caps in REQUIRE.captures_iter(source) {
            let ext = if &caps[1] == "LoadClass" { "cls" } else { "sty" };
            self.load(&format!("{}.{}", &caps[2], ext), order)?;
        }
        Ok(())
    }

    fn defined(&self, order: &[String]) -> HashSet<String> {
        let mut defined = self.kernel.clone();
        for name in order {
            let source = &self.sources[name];
            for caps in COMMAND.captures_iter(source) {
                defined.insert(caps[1].to_string());
            }
            for caps in ENVIRONMENT.captures_iter(source) {
                defined.insert(caps[1].to_string());
                defined.insert(format!("end{}", &caps[1]));
            }
        }
        defined
    }
}

#[async_trait]
impl CompileOracle for SimulatedEngine {
    async fn compile(
        &self,
        source: &str,
        _format: Format,
        budget: Duration,
    ) -> Result<Transcript, OracleError> {
        let target = Self::target(source).unwrap_or_default();
        let listing = source.contains("\\listfiles");

        if listing {
            *self.listings.entry(target.clone()).or_insert(0) += 1;
            if self.stalled_listings.contains(&target) {
                return Err(OracleError::Timeout(budget));
            }
        } else {
            *self.classifications.entry(target.clone()).or_insert(0) += 1;
            if self.stalled_classifications.contains(&target) {
                return Err(OracleError::Timeout(budget));
            }
        }

        let order = match self.load_order(source) {
            Ok(order) => order,
            Err(missing) => {
                return Ok(Transcript::new(format!(
                    "! LaTeX Error: File `{missing}' not found.\n"
                )));
            }
        };

        let mut log = String::from("This is a simulated engine\n(./code.tex\n");
        if listing {
            log.push_str(" *File List*\n");
            for name in &order {
                log.push_str(&format!("{name:>12}    2024/01/01 v1.0\n"));
            }
            log.push_str(" ***********\n");
        } else {
            let defined = self.defined(&order);
            for caps in CANDIDATE.captures_iter(source) {
                let name = &caps[1];
                if defined.contains(name) {
                    let tag = if defined.contains(&format!("end{name}")) {
                        "env"
                    } else {
                        "cmd"
                    };
                    log.push_str(&format!("{tag}:{name}\n"));
                }
            }
        }
        log.push_str(" )\n");
        Ok(Transcript::new(log))
    }
}
