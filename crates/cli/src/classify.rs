use texscope_core::IndexerConfig;
use tracing::info;

pub async fn run(config: IndexerConfig, name: String) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = texscope_runtime::load_overrides(&config)?;
    let indexer = texscope_runtime::build_default_indexer(config)?;

    let file = indexer.lookup(&name);
    if indexer.resolve(file).await.is_none() {
        return Err(format!("could not classify {name}").into());
    }
    indexer.apply_overrides(&overrides);

    let component = indexer
        .registry()
        .get(&name)
        .ok_or_else(|| format!("{name} has no component"))?;
    info!(
        "{} resolved with {} other components",
        name,
        indexer.registry().components().len() - 1
    );
    println!("{}", serde_json::to_string_pretty(component.as_ref())?);
    Ok(())
}
