//! Loaded page content and the lookups the crawler needs from it.
//!
//! A [`PageContent`] keeps the raw markup and parses it on demand, so it can
//! be held across `.await` points (a parsed `scraper::Html` cannot).

use crate::error::{Result, ScraperError};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// One `<option>` of a `<select>` control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub text: String,
    pub title: Option<String>,
    pub value: Option<String>,
}

/// An element found on a page, detached from the parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    text: String,
    attributes: HashMap<String, String>,
    inner_html: String,
}

impl PageElement {
    fn from_element(el: ElementRef<'_>) -> Self {
        Self {
            text: element_text(el),
            attributes: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            inner_html: el.inner_html(),
        }
    }

    /// Visible text with whitespace collapsed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }

    /// Descendants matching `selector`.
    pub fn find(&self, selector: &str) -> Result<Vec<PageElement>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.inner_html);
        Ok(fragment
            .select(&selector)
            .map(PageElement::from_element)
            .collect())
    }
}

/// Header cells plus data cells of the results table on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Markup of a loaded page
#[derive(Debug, Clone)]
pub struct PageContent {
    url: String,
    html: String,
}

impl PageContent {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn elements(&self, selector: &str) -> Result<Vec<PageElement>> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        Ok(document
            .select(&selector)
            .map(PageElement::from_element)
            .collect())
    }

    pub fn has_element(&self, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    /// Options of the first `<select>` matching `select_selector`.
    ///
    /// An absent control yields an empty list.
    pub fn select_options(&self, select_selector: &str) -> Result<Vec<SelectOption>> {
        let select = parse_selector(select_selector)?;
        let option = parse_selector("option")?;
        let document = Html::parse_document(&self.html);

        let Some(control) = document.select(&select).next() else {
            return Ok(Vec::new());
        };

        Ok(control
            .select(&option)
            .map(|opt| SelectOption {
                text: element_text(opt),
                title: opt.value().attr("title").map(str::to_string),
                value: opt.value().attr("value").map(str::to_string),
            })
            .collect())
    }

    /// Reads the page's table rows.
    ///
    /// Headers come from the first `<tr>` holding `<th>` cells; every later
    /// `<tr>` contributes its `<td>` cells as a row.
    pub fn raw_table(&self) -> Result<RawTable> {
        let tr = parse_selector("tr")?;
        let th = parse_selector("th")?;
        let td = parse_selector("td")?;
        let document = Html::parse_document(&self.html);

        let mut table = RawTable::default();
        let mut seen_header = false;
        for row in document.select(&tr) {
            if !seen_header {
                let headers: Vec<String> = row.select(&th).map(element_text).collect();
                if !headers.is_empty() {
                    table.headers = headers;
                    seen_header = true;
                }
                continue;
            }
            table.rows.push(row.select(&td).map(element_text).collect());
        }
        Ok(table)
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <select class="compChooser">
            <option title="2019-11-28" value="1162"> IFSC Climbing Worldcup (B) - Toulouse 2019 </option>
            <option title="2019-08-11" value="1058">IFSC Climbing World Championships - Hachioji 2019</option>
          </select>
        </body></html>
    "#;

    #[test]
    fn select_options_read_text_title_and_value() {
        let page = PageContent::new("https://example.test", LISTING);
        let options = page.select_options("select[class='compChooser']").unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].text, "IFSC Climbing Worldcup (B) - Toulouse 2019");
        assert_eq!(options[0].title.as_deref(), Some("2019-11-28"));
        assert_eq!(options[1].value.as_deref(), Some("1058"));
    }

    #[test]
    fn select_options_empty_when_control_missing() {
        let page = PageContent::new("https://example.test", "<html><body></body></html>");
        let options = page.select_options("select.compChooser").unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn raw_table_splits_header_and_rows() {
        let html = r#"
            <table>
              <tr><th>Rank</th><th>Name</th><th>Country</th></tr>
              <tr><td>1</td><td>Adam</td><td>ONDRA</td><td>CZE</td></tr>
              <tr><td>2</td><td>Jakob</td></tr>
            </table>
        "#;
        let table = PageContent::new("u", html).raw_table().unwrap();

        assert_eq!(table.headers, vec!["Rank", "Name", "Country"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "Adam", "ONDRA", "CZE"]);
        assert_eq!(table.rows[1], vec!["2", "Jakob"]);
    }

    #[test]
    fn element_find_reads_nested_anchor() {
        let html = r#"
            <table><tr>
              <th colspan="4"><a href="/results/lead-men">IFSC World Cup Men lead 28 - 29 Nov 2019</a></th>
            </tr></table>
        "#;
        let page = PageContent::new("u", html);
        let headers = page.elements("th[colspan='4']").unwrap();
        assert_eq!(headers.len(), 1);

        let anchors = headers[0].find("a").unwrap();
        assert_eq!(anchors[0].attr("href"), Some("/results/lead-men"));
        assert_eq!(headers[0].text(), "IFSC World Cup Men lead 28 - 29 Nov 2019");
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let page = PageContent::new("u", "<p></p>");
        let err = page.elements("th[[").unwrap_err();
        assert!(matches!(err, ScraperError::Selector { .. }));
    }
}
