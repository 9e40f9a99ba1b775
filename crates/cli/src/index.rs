use std::path::PathBuf;
use texscope_core::IndexerConfig;
use tracing::info;

pub async fn run(
    config: IndexerConfig,
    out: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = texscope_runtime::load_overrides(&config)?;
    let indexer = texscope_runtime::build_default_indexer(config)?;

    let mut files = indexer.targets();
    if let Some(limit) = limit {
        files.truncate(limit);
    }
    info!("Indexing {} classes and packages...", files.len());

    let report = indexer.index(files).await;
    let failed = indexer.apply_overrides(&overrides);

    let components = indexer.export();
    let json = serde_json::to_string_pretty(&components)?;
    match out {
        Some(path) => {
            std::fs::write(&path, json)?;
            info!("Wrote {} components to {}", components.len(), path.display());
        }
        None => println!("{json}"),
    }

    info!("Indexing complete!");
    info!("Components: {}", report.components);
    info!("Files probed: {}", report.probed);
    info!("Skipped: {}", report.skipped.len());
    info!("Overrides without target: {}", failed.len());

    Ok(())
}
