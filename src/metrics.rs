//! Prometheus recorder behind the `metrics` macros.
//!
//! The binary installs it once at startup. At the end of a run the pipeline
//! renders the handle into the Pushgateway body.

use crate::error::{Result, ScraperError};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock};
use tracing::info;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INSTALL: Mutex<()> = Mutex::new(());

/// Installs the global Prometheus recorder. Idempotent and safe to race.
pub fn init_metrics() -> Result<()> {
    let _installing = INSTALL
        .lock()
        .map_err(|_| ScraperError::Metrics("recorder install lock poisoned".to_string()))?;
    if HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ScraperError::Metrics(e.to_string()))?;
    if HANDLE.set(handle).is_ok() {
        info!("Prometheus recorder installed");
    }
    Ok(())
}

/// Everything recorded so far, in the Prometheus text format.
///
/// `None` until [`init_metrics`] has run.
pub fn render() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}
