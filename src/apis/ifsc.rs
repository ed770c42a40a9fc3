use crate::app::ports::PageFetcher;
use crate::config::SiteConfig;
use crate::constants::COMPETITION_FRAGMENT;
use crate::error::{Result, ScraperError};
use crate::parser::{extract_records, record_prefix};
use crate::types::{CategoryKind, CompetitionRef, ResultRecord, SubcategoryRef};
use reqwest::Url;
use tracing::{debug, info, instrument, warn};

/// Crawler for the IFSC results site
///
/// Borrows the run's fetch session; every page load goes through it.
pub struct IfscCrawler<'a> {
    fetcher: &'a dyn PageFetcher,
    site: &'a SiteConfig,
}

impl<'a> IfscCrawler<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, site: &'a SiteConfig) -> Self {
        Self { fetcher, site }
    }

    /// Competitions listed in the chooser, in page order (most recent first).
    #[instrument(skip(self))]
    pub async fn discover_competitions(&self) -> Result<Vec<CompetitionRef>> {
        let listing_url = self.site.listing_url.as_str();
        let page = self
            .fetcher
            .fetch(listing_url, self.site.timeout(), self.site.result_wait())
            .await?;

        let options = page.select_options(&self.site.chooser_selector)?;
        if options.is_empty() {
            warn!(
                "No competition options found with '{}' on {}",
                self.site.chooser_selector, listing_url
            );
        }

        let mut competitions = Vec::with_capacity(options.len());
        for option in options {
            let Some(value) = option.value.filter(|v| !v.trim().is_empty()) else {
                warn!("Skipping competition option without value: '{}'", option.text);
                continue;
            };
            competitions.push(CompetitionRef {
                name: option.text.trim().to_string(),
                date: option.title.unwrap_or_default(),
                result_page_url: format!("{listing_url}{COMPETITION_FRAGMENT}{}", value.trim()),
            });
        }

        info!("Discovered {} competitions", competitions.len());
        Ok(competitions)
    }

    /// Category result pages linked from a competition's page.
    #[instrument(skip(self, competition), fields(competition = %competition.name))]
    pub async fn discover_subcategories(
        &self,
        competition: &CompetitionRef,
    ) -> Result<Vec<SubcategoryRef>> {
        let page = self
            .fetcher
            .fetch(
                &competition.result_page_url,
                self.site.timeout(),
                self.site.competition_wait(),
            )
            .await?;

        let mut subcategories = Vec::new();
        for header in page.elements(&self.site.subcategory_selector)? {
            let anchors = header.find("a")?;
            let Some(href) = anchors.first().and_then(|a| a.attr("href")) else {
                warn!("Subcategory header without link: '{}'", header.text());
                continue;
            };
            subcategories.push(SubcategoryRef {
                label: header.text().to_string(),
                url: resolve_link(page.url(), href)?,
            });
        }

        debug!(
            "Found {} subcategories for {}",
            subcategories.len(),
            competition.name
        );
        Ok(subcategories)
    }

    /// Records of one category result page, prefixed with the competition fields.
    #[instrument(skip(self, competition, subcategory), fields(label = %subcategory.label))]
    pub async fn scrape_subcategory(
        &self,
        competition: &CompetitionRef,
        subcategory: &SubcategoryRef,
        kind: CategoryKind,
    ) -> Result<Vec<ResultRecord>> {
        let page = self
            .fetcher
            .fetch(&subcategory.url, self.site.timeout(), self.site.result_wait())
            .await?;

        let table = page.raw_table()?;
        if table.headers.is_empty() {
            warn!("No results table on {}", subcategory.url);
            return Ok(Vec::new());
        }

        let records = extract_records(&table, &record_prefix(competition, kind));
        info!(
            "Scraped {} {} records from '{}'",
            records.len(),
            kind,
            subcategory.label
        );
        Ok(records)
    }
}

/// Resolves a possibly relative `href` against the page it was found on.
pub fn resolve_link(base: &str, href: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|e| ScraperError::Api {
        message: format!("Invalid page URL '{base}': {e}"),
    })?;
    let url = base.join(href).map_err(|e| ScraperError::Api {
        message: format!("Invalid link '{href}': {e}"),
    })?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_links_resolve_against_page() {
        let resolved = resolve_link(
            "https://www.ifsc-climbing.org/index.php/world-competition/last-result#!comp=1162",
            "/index.php?option=com_ifscranking&cat=3",
        )
        .unwrap();
        assert_eq!(
            resolved,
            "https://www.ifsc-climbing.org/index.php?option=com_ifscranking&cat=3"
        );
    }

    #[test]
    fn absolute_links_are_kept() {
        let resolved = resolve_link("https://a.test/x", "https://b.test/results/7").unwrap();
        assert_eq!(resolved, "https://b.test/results/7");
    }

    #[test]
    fn invalid_base_is_an_error() {
        assert!(resolve_link("not a url", "/x").is_err());
    }
}
