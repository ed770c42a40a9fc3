use crate::app::ports::PageFetcher;
use crate::config::SiteConfig;
use crate::error::{Result, ScraperError};
use crate::page::{parse_selector, PageContent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// The one page-fetching session of a run.
///
/// Opened at run start and closed at run end or on a fatal error. A page
/// counts as loaded once the ready marker appears in its markup; until then
/// it is re-requested every `poll_interval`.
pub struct ReqwestFetchSession {
    client: reqwest::Client,
    ready_marker: String,
    poll_interval: Duration,
    closed: AtomicBool,
}

impl ReqwestFetchSession {
    pub fn open(site: &SiteConfig) -> Result<Self> {
        // fail on a bad marker now rather than on the first page
        parse_selector(&site.ready_marker_selector)?;

        let client = reqwest::Client::builder()
            .user_agent(site.user_agent.as_str())
            .gzip(true)
            .build()?;
        info!("Opened fetch session");

        Ok(Self {
            client,
            ready_marker: site.ready_marker_selector.clone(),
            poll_interval: site.poll_interval(),
            closed: AtomicBool::new(false),
        })
    }

    async fn load_until_ready(&self, url: &str) -> Result<PageContent> {
        loop {
            let body = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            let page = PageContent::new(url, body);
            if page.has_element(&self.ready_marker)? {
                return Ok(page);
            }
            debug!("Ready marker not present on {}, polling again", url);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetchSession {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        post_load_wait: Duration,
    ) -> Result<PageContent> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ScraperError::Api {
                message: format!("Fetch session closed, cannot load {url}"),
            });
        }
        ensure_server_routed(url)?;

        let page = match tokio::time::timeout(timeout, self.load_until_ready(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScraperError::FetchTimeout {
                    url: url.to_string(),
                    timeout_secs: timeout.as_secs(),
                })
            }
        };

        tokio::time::sleep(post_load_wait).await;
        debug!("Loaded {} ({} bytes)", url, page.html().len());
        Ok(page)
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Closed fetch session");
        }
        Ok(())
    }
}

/// Rejects URLs a plain HTTP client would load as some other page.
///
/// A `#!` fragment is a route resolved by the page's scripts; the request
/// drops it and the server answers with the page before the `#`.
fn ensure_server_routed(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::Api {
        message: format!("Invalid page URL '{url}': {e}"),
    })?;
    if let Some(route) = parsed.fragment().filter(|f| f.starts_with('!')) {
        return Err(ScraperError::Api {
            message: format!(
                "Cannot load {url}: client-side route '#{route}' needs a script-capable fetcher"
            ),
        });
    }
    Ok(())
}
