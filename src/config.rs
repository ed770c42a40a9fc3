use crate::constants::*;
use crate::error::{Result, ScraperError};
use crate::pipeline::normalize::registry::VariantGroup;
use crate::types::CategoryKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub run: RunConfig,
    pub classifier: ClassifierConfig,
    pub normalize: NormalizeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub listing_url: String,
    pub ready_marker_selector: String,
    pub chooser_selector: String,
    pub subcategory_selector: String,
    pub timeout_seconds: u64,
    pub competition_wait_seconds: u64,
    pub result_wait_seconds: u64,
    pub poll_interval_ms: u64,
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            ready_marker_selector: READY_MARKER_SELECTOR.to_string(),
            chooser_selector: COMPETITION_CHOOSER_SELECTOR.to_string(),
            subcategory_selector: SUBCATEGORY_HEADER_SELECTOR.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            competition_wait_seconds: COMPETITION_PAGE_WAIT_SECS,
            result_wait_seconds: RESULT_PAGE_WAIT_SECS,
            poll_interval_ms: 500,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn competition_wait(&self) -> Duration {
        Duration::from_secs(self.competition_wait_seconds)
    }

    pub fn result_wait(&self) -> Duration {
        Duration::from_secs(self.result_wait_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub lead_file: String,
    pub speed_file: String,
    pub boulder_file: String,
    pub combined_file: String,
    pub registry_file: String,
    pub report_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            lead_file: LEAD_RESULTS_FILE.to_string(),
            speed_file: SPEED_RESULTS_FILE.to_string(),
            boulder_file: BOULDER_RESULTS_FILE.to_string(),
            combined_file: COMBINED_RESULTS_FILE.to_string(),
            registry_file: NAME_REGISTRY_FILE.to_string(),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
        }
    }
}

impl StorageConfig {
    /// Same layout rooted at another data directory.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// File backing the dataset of `kind`; `Unknown` has none.
    pub fn dataset_path(&self, kind: CategoryKind) -> Option<PathBuf> {
        let file = match kind {
            CategoryKind::Lead => &self.lead_file,
            CategoryKind::Speed => &self.speed_file,
            CategoryKind::Boulder => &self.boulder_file,
            CategoryKind::Combined => &self.combined_file,
            CategoryKind::Unknown => return None,
        };
        Some(self.data_dir.join(file))
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Scrape at most this many new competitions.
    pub debug_limit: Option<usize>,
    pub write_report: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            debug_limit: None,
            write_report: true,
        }
    }
}

/// Suffix overrides; an omitted kind keeps its built-in suffixes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub lead: Option<Vec<String>>,
    pub speed: Option<Vec<String>>,
    pub boulder: Option<Vec<String>>,
    pub combined: Option<Vec<String>>,
}

impl ClassifierConfig {
    pub fn suffixes_for(&self, kind: CategoryKind) -> Option<&[String]> {
        match kind {
            CategoryKind::Lead => self.lead.as_deref(),
            CategoryKind::Speed => self.speed.as_deref(),
            CategoryKind::Boulder => self.boulder.as_deref(),
            CategoryKind::Combined => self.combined.as_deref(),
            CategoryKind::Unknown => None,
        }
    }
}

/// Extra variant groups per kind, merged into the built-in table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub lead: Vec<VariantGroup>,
    pub speed: Vec<VariantGroup>,
    pub boulder: Vec<VariantGroup>,
    pub combined: Vec<VariantGroup>,
}

impl NormalizeConfig {
    pub fn groups_for(&self, kind: CategoryKind) -> &[VariantGroup] {
        match kind {
            CategoryKind::Lead => &self.lead,
            CategoryKind::Speed => &self.speed,
            CategoryKind::Boulder => &self.boulder,
            CategoryKind::Combined => &self.combined,
            CategoryKind::Unknown => &[],
        }
    }
}

impl Config {
    /// Loads `config.toml` (or the file named by `IFSC_CONFIG`).
    ///
    /// A missing file is not an error; built-in defaults apply.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "No config file at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
