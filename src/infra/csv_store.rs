use crate::app::ports::DatasetStore;
use crate::config::StorageConfig;
use crate::constants::FIELD_COMPETITION_TITLE;
use crate::error::{Result, ScraperError};
use crate::types::{CategoryDataset, CategoryKind, ResultRecord};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Datasets as flat CSV files with a header row, one file per category
pub struct CsvStorage {
    config: StorageConfig,
}

impl CsvStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn dataset_path(&self, kind: CategoryKind) -> Result<PathBuf> {
        self.config.dataset_path(kind).ok_or_else(|| ScraperError::Api {
            message: format!("No dataset file for category '{kind}'"),
        })
    }

    fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.config.data_dir)?;
        Ok(())
    }
}

/// Reads a CSV file into records keyed by its header row.
pub fn read_records(path: &Path) -> Result<Vec<ResultRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: ResultRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Writes records under `columns`, blank where a record lacks a column.
pub fn write_records(path: &Path, columns: &[String], records: &[ResultRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if !columns.is_empty() {
        writer.write_record(columns)?;
        for record in records {
            writer.write_record(
                columns
                    .iter()
                    .map(|c| record.get(c).map(String::as_str).unwrap_or("")),
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[async_trait]
impl DatasetStore for CsvStorage {
    async fn load_dataset(&self, kind: CategoryKind) -> Result<CategoryDataset> {
        let path = self.dataset_path(kind)?;
        if !path.exists() {
            info!("No persisted {} dataset at {}, starting empty", kind, path.display());
            return Ok(CategoryDataset::new(kind));
        }

        let records = read_records(&path)?;
        debug!("Loaded {} {} records from {}", records.len(), kind, path.display());
        Ok(CategoryDataset::with_records(kind, records))
    }

    async fn save_dataset(&self, dataset: &CategoryDataset) -> Result<()> {
        self.ensure_data_dir()?;
        let path = self.dataset_path(dataset.kind)?;
        write_records(&path, &dataset.columns(), &dataset.records)?;
        info!(
            "Wrote {} {} records to {}",
            dataset.len(),
            dataset.kind,
            path.display()
        );
        Ok(())
    }

    async fn load_registry(&self) -> Result<HashSet<String>> {
        let path = self.config.registry_path();
        if !path.exists() {
            info!("No name registry at {}, treating every competition as new", path.display());
            return Ok(HashSet::new());
        }

        let records = read_records(&path)?;
        let mut names = HashSet::new();
        for record in records {
            let name = record
                .get(FIELD_COMPETITION_TITLE)
                .ok_or_else(|| {
                    ScraperError::MissingField(format!(
                        "'{}' column in {}",
                        FIELD_COMPETITION_TITLE,
                        path.display()
                    ))
                })?;
            if !name.trim().is_empty() {
                names.insert(name.clone());
            }
        }
        debug!("Loaded {} registered competition names", names.len());
        Ok(names)
    }

    async fn save_registry(&self, names: &BTreeSet<String>) -> Result<()> {
        self.ensure_data_dir()?;
        let path = self.config.registry_path();

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([FIELD_COMPETITION_TITLE])?;
        for name in names {
            writer.write_record([name.as_str()])?;
        }
        writer.flush()?;

        info!("Wrote {} competition names to {}", names.len(), path.display());
        Ok(())
    }
}
