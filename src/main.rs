use anyhow::Context;
use clap::Parser;
use ifsc_scraper::config::Config;
use ifsc_scraper::infra::http_fetcher::ReqwestFetchSession;
use ifsc_scraper::logging;
use ifsc_scraper::pipeline::Pipeline;
use ifsc_scraper::storage::CsvStorage;
use tracing::{error, info, warn};

/// Scrapes new IFSC competitions and merges them into the category datasets.
///
/// Settings come from `config.toml` (or the file named by `IFSC_CONFIG`).
#[derive(Parser)]
#[command(name = "ifsc_scraper")]
#[command(version)]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();
    if let Err(e) = ifsc_scraper::metrics::init_metrics() {
        warn!("Metrics recorder unavailable: {}", e);
    }
    let _cli = Cli::parse();

    let config = Config::load().context("loading configuration")?;
    info!("Data directory: {}", config.storage.data_dir.display());

    let session = ReqwestFetchSession::open(&config.site).context("opening fetch session")?;
    let storage = CsvStorage::new(config.storage.clone());

    println!("🚀 Running IFSC scrape...");
    let result = match Pipeline::new(&config, &session, &storage).run().await {
        Ok(result) => result,
        Err(e) => {
            error!("Scrape failed: {}", e);
            println!("❌ Scrape failed: {}", e);
            return Err(e).context("scrape run aborted");
        }
    };

    println!("\n📊 Run results:");
    println!("   Competitions listed: {}", result.competitions_discovered);
    println!("   New competitions: {}", result.new_competitions.len());
    for (kind, count) in &result.records_scraped {
        let total = result.dataset_sizes.get(kind).copied().unwrap_or_default();
        println!("   {kind}: {count} new records ({total} total)");
    }
    if let Some(report) = &result.report_file {
        println!("   Report: {report}");
    }

    if !result.unknown_labels.is_empty() {
        warn!(
            "{} subcategories skipped with unrecognized labels",
            result.unknown_labels.len()
        );
        println!("\n⚠️  Skipped unrecognized subcategories:");
        for label in &result.unknown_labels {
            println!("   - {label}");
        }
    }

    println!("✅ Scrape completed successfully");
    Ok(())
}
