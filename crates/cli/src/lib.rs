mod classify;
mod deps;
mod index;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use texscope_core::IndexerConfig;

#[derive(Parser)]
#[command(
    name = "texscope",
    version,
    about = "Builds a knowledge base of the commands and environments TeX packages define",
    long_about = "texscope loads every class and package of the installed TeX distribution in small \
                  probe documents, works out which files depend on which, and attributes each \
                  defined command or environment to the first file that introduces it."
)]
pub struct Cli {
    /// JSON configuration file; every field is optional
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run probes one at a time
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Maximum number of engine processes running at once
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index every class and package and write the component list as JSON
    #[command(
        long_about = "Resolves every class and package found in the distribution's ls-R database, \
                      applies the configured overrides, and writes the components followed by the \
                      kernel primitives. Output goes to stdout unless --out is given."
    )]
    Index {
        /// Output file for the component list
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Only index the first N files of the name index
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Print the files loaded by a class or package
    Deps {
        /// File name, e.g. amsmath.sty
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Resolve one class or package and print its component
    Classify {
        /// File name, e.g. amsmath.sty
        #[arg(value_name = "NAME")]
        name: String,
    },
}

impl Cli {
    fn indexer_config(&self) -> Result<IndexerConfig, Box<dyn std::error::Error>> {
        let mut config = texscope_runtime::load_config(self.config.as_deref())?;
        if self.sequential {
            config.sequential = true;
        }
        if let Some(jobs) = self.jobs {
            config.max_in_flight = jobs;
        }
        Ok(config)
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.indexer_config()?;

    let component = match &cli.command {
        Commands::Index { .. } => "index",
        Commands::Deps { .. } => "deps",
        Commands::Classify { .. } => "classify",
    };
    let _guard = texscope_runtime::init_logging(component, &config, true);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Index { out, limit } => rt.block_on(index::run(config, out, limit)),
        Commands::Deps { name } => rt.block_on(deps::run(config, name)),
        Commands::Classify { name } => rt.block_on(classify::run(config, name)),
    }
}
