use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out waiting for page {url} to load ({timeout_secs}s)")]
    FetchTimeout { url: String, timeout_secs: u64 },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("API error: {message}")]
    Api { message: String },
}

impl ScraperError {
    /// Errors that must abort the whole run rather than a single page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScraperError::FetchTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
