use anyhow::Context;
use ifsc_scraper::config::Config;
use ifsc_scraper::pipeline::rebuild_registry;
use ifsc_scraper::storage::CsvStorage;

/// Regenerates the competition name registry from the persisted datasets.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::load().context("loading configuration")?;
    let storage = CsvStorage::new(config.storage.clone());

    println!(
        "🔧 Rebuilding {} from datasets in {}",
        config.storage.registry_file,
        config.storage.data_dir.display()
    );
    let names = rebuild_registry(&storage)
        .await
        .context("rebuilding name registry")?;

    println!("✅ Registry holds {} competition names", names.len());
    Ok(())
}
