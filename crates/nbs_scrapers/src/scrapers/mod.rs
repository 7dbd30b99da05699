use nbs_core::{ArticleRecord, Result, SiteRules};
use scraper::Html;

pub mod slovakia;
use slovakia::nbs::NbsScraper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub emoji: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub emoji: &'static str,
    pub region: Region,
}

/// Site-specific field extraction. Fetching is left to the
/// [`crate::ScraperManager`], so implementations stay synchronous and pure.
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// The fixed list of article pages this source is crawled from.
    fn start_urls(&self) -> Vec<String>;

    /// Builds one record from a fetched page. Never fails: a selector that
    /// finds nothing yields an empty field.
    fn extract(&self, document: &Html, url: &str) -> ArticleRecord;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }
}

pub type BoxedScraper = Box<dyn Scraper>;

/// Every scraper the crate ships, configured with `rules`.
pub fn default_scrapers(rules: &SiteRules) -> Result<Vec<BoxedScraper>> {
    Ok(vec![Box::new(NbsScraper::with_rules(rules.clone())?)])
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use nbs_core::{Error, Result};
    use scraper::{Html, Selector};
    use url::Url;

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {:?}", selector, e)))
    }

    /// Trimmed text of the first element matching any of `selectors`, tried
    /// in order. Empty when nothing matches.
    pub fn first_text<S: AsRef<str>>(document: &Html, selectors: &[S]) -> String {
        first_raw_text(document, selectors).trim().to_string()
    }

    /// Like [`first_text`], but keeps the text exactly as it appears.
    pub fn first_raw_text<S: AsRef<str>>(document: &Html, selectors: &[S]) -> String {
        for selector in selectors {
            let selector = match parse_selector(selector.as_ref()) {
                Ok(selector) => selector,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping selector");
                    continue;
                }
            };
            if let Some(element) = document.select(&selector).next() {
                return element.text().collect::<String>();
            }
        }
        String::new()
    }

    /// Raw markup of every element matching `selector`, in document order.
    pub fn outer_html(document: &Html, selector: &str) -> Vec<String> {
        match parse_selector(selector) {
            Ok(selector) => document.select(&selector).map(|el| el.html()).collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping selector");
                Vec::new()
            }
        }
    }

    /// True when the URL's host is one of `hosts` or a subdomain of one.
    pub fn host_matches(url: &str, hosts: &[String]) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        hosts.iter().any(|allowed| {
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
