//! Incremental scraper for IFSC competition results.

pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod page;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod types;
