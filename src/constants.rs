/// Site, storage and schema constants shared across the codebase

// Listing page with the competition chooser
pub const LISTING_URL: &str = "https://www.ifsc-climbing.org/index.php/world-competition/last-result";
pub const COMPETITION_FRAGMENT: &str = "#!comp=";

// Selectors (CSS equivalents of the site's XPath lookups)
pub const READY_MARKER_SELECTOR: &str =
    "div[class='uk-section-primary uk-section uk-section-xsmall']";
pub const COMPETITION_CHOOSER_SELECTOR: &str = "select[class='compChooser']";
pub const SUBCATEGORY_HEADER_SELECTOR: &str = "th[colspan='4']";

// Load timing, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const RESULT_PAGE_WAIT_SECS: u64 = 10;
pub const COMPETITION_PAGE_WAIT_SECS: u64 = 3;

// Prefix fields present on every record
pub const FIELD_COMPETITION_TITLE: &str = "Competition Title";
pub const FIELD_COMPETITION_DATE: &str = "Competition Date";
pub const FIELD_CATEGORY: &str = "Category";

// Header correction for the athlete name columns
pub const FIELD_LAST_NAME: &str = "LAST";
pub const FIELD_FIRST_NAME: &str = "FIRST";

/// Number of trailing characters (venue/date) on every subcategory label
pub const LABEL_SUFFIX_LEN: usize = 16;

// Persisted files
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORT_DIR: &str = "output";
pub const LEAD_RESULTS_FILE: &str = "lead_results.csv";
pub const SPEED_RESULTS_FILE: &str = "speed_results.csv";
pub const BOULDER_RESULTS_FILE: &str = "boulder_results.csv";
pub const COMBINED_RESULTS_FILE: &str = "combined_results.csv";
pub const NAME_REGISTRY_FILE: &str = "competition_names.csv";

// Logging
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "ifsc_scraper.log";
pub const DEFAULT_LOG_FILTER: &str = "ifsc_scraper=debug,hyper=warn,reqwest=warn,info";

// Environment
pub const CONFIG_PATH_ENV: &str = "IFSC_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const PUSHGATEWAY_URL_ENV: &str = "IFSC_PUSHGATEWAY_URL";
