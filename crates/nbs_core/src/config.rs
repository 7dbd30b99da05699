use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Selector and stop-marker rules for one site's article pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteRules {
    /// Hosts these rules apply to; subdomains match too.
    pub hosts: Vec<String>,
    pub date_selector: String,
    /// Tried in order; the first one that matches wins.
    pub headline_selectors: Vec<String>,
    pub label_selector: String,
    pub paragraph_selector: String,
    /// Literal substrings that end the article body.
    pub stop_literals: Vec<String>,
    /// Treat `<strong>`/`<b>` inside a paragraph as the end of the body.
    pub stop_on_bold: bool,
}

impl Default for SiteRules {
    fn default() -> Self {
        Self {
            hosts: vec!["nbs.sk".to_string()],
            date_selector: "div.nbs-post__date".to_string(),
            headline_selectors: vec!["h1.headline".to_string(), "h1".to_string()],
            label_selector: "div.label--sm".to_string(),
            paragraph_selector: "p".to_string(),
            stop_literals: vec!["Internet:".to_string()],
            stop_on_bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Pages to ingest. Empty means "use the scraper's start URLs".
    pub urls: Vec<String>,
    /// Maximum number of pages fetched at the same time.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub rules: SiteRules,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            concurrency: 4,
            timeout_secs: 30,
            user_agent: concat!("nbs-news/", env!("CARGO_PKG_VERSION")).to_string(),
            rules: SiteRules::default(),
        }
    }
}

impl CrawlConfig {
    /// Loads a JSON config file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        for url in &self.urls {
            Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_nbs_pages() {
        let rules = SiteRules::default();
        assert_eq!(rules.date_selector, "div.nbs-post__date");
        assert_eq!(rules.label_selector, "div.label--sm");
        assert!(rules.stop_on_bold);
        assert!(CrawlConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"urls": ["https://nbs.sk/en/news/a/"], "concurrency": 2}}"#
        )
        .unwrap();

        let config = CrawlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.urls.len(), 1);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.rules, SiteRules::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = CrawlConfig {
            concurrency: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = CrawlConfig {
            urls: vec!["not a url".to_string()],
            ..CrawlConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }
}
