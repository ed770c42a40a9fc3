#![allow(dead_code)]

use async_trait::async_trait;
use ifsc_scraper::app::ports::PageFetcher;
use ifsc_scraper::config::Config;
use ifsc_scraper::constants::{COMPETITION_FRAGMENT, LISTING_URL};
use ifsc_scraper::error::{Result, ScraperError};
use ifsc_scraper::page::PageContent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const RESULTS_HOST: &str = "https://www.ifsc-climbing.org";

/// Serves canned pages; an unknown URL behaves like a page that never loads.
#[derive(Default)]
pub struct FakeSite {
    pages: Mutex<HashMap<String, String>>,
    fetched: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.lock().unwrap().insert(url.into(), html.into());
    }

    pub fn remove(&self, url: &str) {
        self.pages.lock().unwrap().remove(url);
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn clear_fetched(&self) {
        self.fetched.lock().unwrap().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        _post_load_wait: Duration,
    ) -> Result<PageContent> {
        assert!(!self.is_closed(), "fetch after close: {url}");
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(html) => Ok(PageContent::new(url, html.clone())),
            None => Err(ScraperError::FetchTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.run.write_report = false;
    config
}

pub fn competition_url(id: &str) -> String {
    format!("{LISTING_URL}{COMPETITION_FRAGMENT}{id}")
}

pub fn result_url(path: &str) -> String {
    format!("{RESULTS_HOST}{path}")
}

/// (name, date, id) triples in chooser order
pub fn listing_page(competitions: &[(&str, &str, &str)]) -> String {
    let options: String = competitions
        .iter()
        .map(|(name, date, id)| format!(r#"<option title="{date}" value="{id}">{name}</option>"#))
        .collect();
    format!(
        r#"<html><body>
        <div class="uk-section-primary uk-section uk-section-xsmall">Results</div>
        <select class="compChooser">{options}</select>
        </body></html>"#
    )
}

/// (label, href) pairs, one subcategory header each
pub fn competition_page(subcategories: &[(&str, &str)]) -> String {
    let headers: String = subcategories
        .iter()
        .map(|(label, href)| {
            format!(r#"<table><tr><th colspan="4"><a href="{href}">{label}</a></th></tr></table>"#)
        })
        .collect();
    format!(r#"<html><body>{headers}</body></html>"#)
}

pub fn results_page(headers: &[&str], rows: &[&[&str]]) -> String {
    let header_cells: String = headers.iter().map(|h| format!("<th>{h}</th>")).collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| format!("<td>{c}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(r#"<html><body><table><tr>{header_cells}</tr>{body}</table></body></html>"#)
}
