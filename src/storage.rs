use crate::app::ports::DatasetStore;
use crate::error::{Result, ScraperError};
use crate::types::{CategoryDataset, CategoryKind};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub use crate::infra::csv_store::CsvStorage;

/// In-memory storage implementation for development/testing
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    datasets: Arc<Mutex<HashMap<CategoryKind, CategoryDataset>>>,
    registry: Arc<Mutex<Option<BTreeSet<String>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `datasets`.
    pub fn with_datasets(datasets: impl IntoIterator<Item = CategoryDataset>) -> Self {
        let storage = Self::new();
        if let Ok(mut map) = storage.datasets.lock() {
            for dataset in datasets {
                map.insert(dataset.kind, dataset);
            }
        }
        storage
    }

    /// Registry as last saved; `None` until the first save.
    pub fn registry_snapshot(&self) -> Option<BTreeSet<String>> {
        self.registry.lock().ok().and_then(|r| r.clone())
    }

    pub fn dataset_snapshot(&self, kind: CategoryKind) -> Option<CategoryDataset> {
        self.datasets.lock().ok().and_then(|d| d.get(&kind).cloned())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| ScraperError::Api {
        message: "in-memory storage lock poisoned".to_string(),
    })
}

#[async_trait]
impl DatasetStore for InMemoryStorage {
    async fn load_dataset(&self, kind: CategoryKind) -> Result<CategoryDataset> {
        let datasets = lock(&self.datasets)?;
        Ok(datasets
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| CategoryDataset::new(kind)))
    }

    async fn save_dataset(&self, dataset: &CategoryDataset) -> Result<()> {
        let mut datasets = lock(&self.datasets)?;
        datasets.insert(dataset.kind, dataset.clone());
        debug!("Saved {} {} records in memory", dataset.len(), dataset.kind);
        Ok(())
    }

    async fn load_registry(&self) -> Result<HashSet<String>> {
        let registry = lock(&self.registry)?;
        Ok(registry
            .as_ref()
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn save_registry(&self, names: &BTreeSet<String>) -> Result<()> {
        let mut registry = lock(&self.registry)?;
        *registry = Some(names.clone());
        debug!("Saved {} registry names in memory", names.len());
        Ok(())
    }
}
