use texscope_core::IndexerConfig;
use texscope_core::model::ProbeOutcome;
use tracing::warn;

pub async fn run(config: IndexerConfig, name: String) -> Result<(), Box<dyn std::error::Error>> {
    let indexer = texscope_runtime::build_default_indexer(config)?;
    let dependency = indexer.dependency(indexer.lookup(&name)).await;

    if let ProbeOutcome::Degraded(reason) = &dependency.outcome {
        warn!("Dependencies of {} are unknown: {}", name, reason);
    }
    for file in dependency.includes.iter().skip(1) {
        println!("{file}");
    }
    Ok(())
}
