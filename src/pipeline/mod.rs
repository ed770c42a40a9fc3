//! One scrape-merge-persist cycle.
//!
//! Discovery → incremental filter → per new competition: subcategory pages,
//! classification, table extraction → normalization → merge → persist.
//! Nothing is written until every page of the run has been scraped, so a
//! fatal fetch error leaves the previous datasets untouched.

pub mod classify;
pub mod filter;
pub mod merge;
pub mod normalize;

use crate::apis::ifsc::IfscCrawler;
use crate::app::ports::{DatasetStore, PageFetcher};
use crate::config::Config;
use crate::constants::PUSHGATEWAY_URL_ENV;
use crate::error::Result;
use crate::types::{CategoryDataset, CategoryKind, ResultRecord};
use chrono::{DateTime, Utc};
use classify::CategoryClassifier;
use filter::filter_new_competitions;
use merge::{merge_dataset, registry_names};
use metrics::{counter, gauge, histogram};
use normalize::registry::VariantRegistry;
use normalize::SchemaNormalizer;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub competitions_discovered: usize,
    pub new_competitions: Vec<String>,
    pub records_scraped: BTreeMap<CategoryKind, usize>,
    pub dataset_sizes: BTreeMap<CategoryKind, usize>,
    pub unknown_labels: Vec<String>,
    pub registry_size: usize,
    pub report_file: Option<String>,
}

impl PipelineResult {
    pub fn total_records_scraped(&self) -> usize {
        self.records_scraped.values().sum()
    }
}

pub struct Pipeline<'a> {
    config: &'a Config,
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn DatasetStore,
    classifier: CategoryClassifier,
    normalizer: SchemaNormalizer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn DatasetStore,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            classifier: CategoryClassifier::from_config(&config.classifier),
            normalizer: SchemaNormalizer::new(VariantRegistry::from_config(&config.normalize)),
        }
    }

    /// Runs one full cycle and closes the fetch session, on success or failure.
    pub async fn run(&self) -> Result<PipelineResult> {
        let t_pipeline = std::time::Instant::now();
        counter!("ifsc_pipeline_runs_total").increment(1);

        let outcome = self.execute().await;

        if let Err(e) = self.fetcher.close().await {
            warn!("Failed to close fetch session: {}", e);
        }

        let total_secs = t_pipeline.elapsed().as_secs_f64();
        histogram!("ifsc_pipeline_duration_seconds").record(total_secs);

        match outcome {
            Ok(mut result) => {
                if self.config.run.write_report {
                    match persist_report(&result, &self.config.storage.report_dir) {
                        Ok(path) => result.report_file = Some(path),
                        Err(e) => warn!("Failed to write run report: {}", e),
                    }
                }
                record_run_gauges(&result);
                push_pushgateway_metrics().await;
                Ok(result)
            }
            Err(e) => {
                counter!("ifsc_pipeline_failures_total").increment(1);
                error!("Run aborted, nothing persisted: {}", e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn execute(&self) -> Result<PipelineResult> {
        let started_at = Utc::now();

        // Step 1: persisted state
        let registry = self.store.load_registry().await?;
        let mut prior = HashMap::new();
        for kind in CategoryKind::SCRAPED {
            prior.insert(kind, self.store.load_dataset(kind).await?);
        }
        info!("Loaded {} registered competition names", registry.len());

        // Step 2: discovery and incremental filter
        let crawler = IfscCrawler::new(self.fetcher, &self.config.site);
        let competitions = crawler.discover_competitions().await?;
        let competitions_discovered = competitions.len();
        counter!("ifsc_competitions_discovered_total").increment(competitions_discovered as u64);

        let mut fresh = filter_new_competitions(competitions, &registry);
        if let Some(limit) = self.config.run.debug_limit {
            if fresh.len() > limit {
                info!("Debug limit: scraping {} of {} new competitions", limit, fresh.len());
                fresh.truncate(limit);
            }
        }
        counter!("ifsc_competitions_new_total").increment(fresh.len() as u64);
        println!("📡 {} competitions listed, {} new", competitions_discovered, fresh.len());

        // Step 3: scrape every known subcategory of each new competition
        let mut scraped: HashMap<CategoryKind, Vec<ResultRecord>> = HashMap::new();
        let mut unknown_labels = Vec::new();
        for competition in &fresh {
            println!("🔧 Scraping {}", competition.name);
            for subcategory in crawler.discover_subcategories(competition).await? {
                let kind = self.classifier.classify(&subcategory.label);
                if kind == CategoryKind::Unknown {
                    counter!("ifsc_unknown_labels_total").increment(1);
                    unknown_labels.push(subcategory.label);
                    continue;
                }
                let records = crawler
                    .scrape_subcategory(competition, &subcategory, kind)
                    .await?;
                scraped.entry(kind).or_default().extend(records);
            }
        }

        // Step 4: normalize and merge
        let mut records_scraped = BTreeMap::new();
        let mut merged: Vec<CategoryDataset> = Vec::with_capacity(CategoryKind::SCRAPED.len());
        for kind in CategoryKind::SCRAPED {
            let mut fresh_records = scraped.remove(&kind).unwrap_or_default();
            records_scraped.insert(kind, fresh_records.len());
            counter!("ifsc_records_scraped_total", "category" => kind.as_str())
                .increment(fresh_records.len() as u64);

            self.normalizer.normalize_records(kind, &mut fresh_records);
            let prior_dataset = prior.remove(&kind).unwrap_or_else(|| CategoryDataset::new(kind));
            let mut dataset = merge_dataset(fresh_records, prior_dataset);
            // picks up variant columns persisted before a group knew them
            self.normalizer.normalize(&mut dataset);
            merged.push(dataset);
        }

        // Step 5: persist datasets and regenerate the registry
        for dataset in &merged {
            self.store.save_dataset(dataset).await?;
        }
        let names = registry_names(&merged);
        self.store.save_registry(&names).await?;
        println!("💾 Saved datasets and {} competition names", names.len());

        Ok(PipelineResult {
            started_at,
            finished_at: Utc::now(),
            competitions_discovered,
            new_competitions: fresh.into_iter().map(|c| c.name).collect(),
            records_scraped,
            dataset_sizes: merged.iter().map(|d| (d.kind, d.len())).collect(),
            unknown_labels,
            registry_size: names.len(),
            report_file: None,
        })
    }
}

/// Regenerates the name registry from the persisted datasets alone.
pub async fn rebuild_registry(store: &dyn DatasetStore) -> Result<BTreeSet<String>> {
    let mut datasets = Vec::with_capacity(CategoryKind::SCRAPED.len());
    for kind in CategoryKind::SCRAPED {
        datasets.push(store.load_dataset(kind).await?);
    }
    let names = registry_names(&datasets);
    store.save_registry(&names).await?;
    info!("Rebuilt registry with {} competition names", names.len());
    Ok(names)
}

/// Writes the run summary as JSON into `report_dir`.
fn persist_report(result: &PipelineResult, report_dir: &Path) -> Result<String> {
    fs::create_dir_all(report_dir)?;

    let timestamp = result.finished_at.format("%Y%m%d_%H%M%S");
    let filepath = report_dir.join(format!("run_{timestamp}.json"));

    let json_content = serde_json::to_string_pretty(result)?;
    fs::write(&filepath, json_content)?;

    Ok(filepath.to_string_lossy().to_string())
}

/// Gauges describing the finished run, for the Pushgateway snapshot.
fn record_run_gauges(result: &PipelineResult) {
    gauge!("ifsc_new_competitions").set(result.new_competitions.len() as f64);
    gauge!("ifsc_unknown_labels").set(result.unknown_labels.len() as f64);
    gauge!("ifsc_registry_names").set(result.registry_size as f64);
    gauge!("ifsc_pipeline_last_run_timestamp_seconds")
        .set(result.finished_at.timestamp() as f64);
    for (kind, rows) in &result.dataset_sizes {
        gauge!("ifsc_dataset_rows", "category" => kind.as_str()).set(*rows as f64);
    }
}

async fn push_pushgateway_metrics() {
    let base = match std::env::var(PUSHGATEWAY_URL_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    let Some(body) = crate::metrics::render() else {
        warn!("{} is set but no metrics recorder is installed", PUSHGATEWAY_URL_ENV);
        return;
    };
    let push_url = format!("{}/metrics/job/ifsc_scraper", base.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let push_res = client
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await;

    match push_res {
        Ok(r) if r.status().is_success() => info!("Pushed run metrics to Pushgateway"),
        Ok(r) => warn!("Pushgateway push responded with status {}", r.status().as_u16()),
        Err(e) => warn!("Failed to push metrics to Pushgateway: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use tempfile::tempdir;

    fn titled(title: &str) -> ResultRecord {
        [(crate::constants::FIELD_COMPETITION_TITLE.to_string(), title.to_string())]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn rebuild_registry_unions_all_datasets() {
        let storage = InMemoryStorage::with_datasets([
            CategoryDataset::with_records(
                CategoryKind::Lead,
                vec![titled("Kranj"), titled("Arco")],
            ),
            CategoryDataset::with_records(CategoryKind::Combined, vec![titled("Toulouse")]),
        ]);

        let names = rebuild_registry(&storage).await.unwrap();

        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Arco", "Kranj", "Toulouse"]);
        assert_eq!(storage.registry_snapshot().map(|r| r.len()), Some(3));
    }

    fn summary(now: DateTime<Utc>) -> PipelineResult {
        PipelineResult {
            started_at: now,
            finished_at: now,
            competitions_discovered: 2,
            new_competitions: vec!["Arco".to_string()],
            records_scraped: [(CategoryKind::Lead, 4)].into_iter().collect(),
            dataset_sizes: [(CategoryKind::Lead, 10)].into_iter().collect(),
            unknown_labels: Vec::new(),
            registry_size: 2,
            report_file: None,
        }
    }

    #[test]
    fn run_gauges_reach_the_rendered_snapshot() {
        crate::metrics::init_metrics().unwrap();

        record_run_gauges(&summary(Utc::now()));

        let body = crate::metrics::render().unwrap();
        assert!(body.contains("ifsc_dataset_rows{category=\"lead\"} 10"), "{body}");
        assert!(body.contains("ifsc_registry_names 2"), "{body}");
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = tempdir().unwrap();
        let result = summary(Utc::now());

        let path = persist_report(&result, dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(json["records_scraped"]["lead"], 4);
        assert_eq!(json["new_competitions"][0], "Arco");
        assert_eq!(result.total_records_scraped(), 4);
    }
}
