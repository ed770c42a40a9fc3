use crate::error::Result;
use crate::page::PageContent;
use crate::types::{CategoryDataset, CategoryKind};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

/// Loads pages for the crawler.
///
/// `fetch` resolves once the page-ready marker is present and
/// `post_load_wait` has elapsed, or fails with `FetchTimeout`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        post_load_wait: Duration,
    ) -> Result<PageContent>;

    /// Tears the session down; no fetch may follow.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Persisted category datasets and the competition name registry.
///
/// Absent datasets or registry load as empty.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn load_dataset(&self, kind: CategoryKind) -> Result<CategoryDataset>;
    async fn save_dataset(&self, dataset: &CategoryDataset) -> Result<()>;

    async fn load_registry(&self) -> Result<HashSet<String>>;
    async fn save_registry(&self, names: &BTreeSet<String>) -> Result<()>;
}
