use nbs_core::{ArticleRecord, Result, SiteRules};
use scraper::Html;

use super::REGION;
use crate::sanitize;
use crate::scrapers::{utils, Scraper, SourceMetadata};

/// News pages of Národná banka Slovenska (nbs.sk).
#[derive(Debug, Clone)]
pub struct NbsScraper {
    rules: SiteRules,
}

impl NbsScraper {
    pub fn new() -> Self {
        Self {
            rules: SiteRules::default(),
        }
    }

    /// Builds a scraper with custom rules, rejecting selectors that do not
    /// parse so extraction itself never has to.
    pub fn with_rules(rules: SiteRules) -> Result<Self> {
        utils::parse_selector(&rules.date_selector)?;
        utils::parse_selector(&rules.label_selector)?;
        utils::parse_selector(&rules.paragraph_selector)?;
        for selector in &rules.headline_selectors {
            utils::parse_selector(selector)?;
        }
        Ok(Self { rules })
    }

    const START_URLS: &'static [&'static str] = &[
        "https://nbs.sk/en/news/s-tatement-from-the-27th-meeting-of-the-bank-board-of-the-nbs/",
        "https://nbs.sk/en/news/report-on-economic-development-in-may-2010-summary/",
        "https://nbs.sk/en/news/statement-from-the-24th-meeting-of-the-bank-board-of-nbs/",
        "https://nbs.sk/en/news/summary-report-on-economic-development-in-april-2010/",
        "https://nbs.sk/en/news/statement-from-the-22nd-meeting-of-the-bank-board-of-nbs/",
        "https://nbs.sk/en/news/statement-from-the-21st-meeting-of-the-bank-board-of-the-nbs-2/",
        "https://nbs.sk/en/news/statement-from-the-20th-meeting-of-the-bank-board-of-the-nbs-3/",
        "https://nbs.sk/en/news/meeting-of-the-nbs-management-representatives-of-banks-and-investment-firms/",
        "https://nbs.sk/en/news/statement-from-the-18th-meeting-of-the-bank-board-of-narodna-banka-slovenska/",
        "https://nbs.sk/en/news/summary-report-on-economic-development-in-march-2010/",
        "https://nbs.sk/en/news/statement-from-the-17th-meeting-of-the-bank-board-of-the-nbs-3/",
        "https://nbs.sk/en/news/statement-from-the-14th-meeting-of-the-bank-board-of-the-nbs-2/",
        "https://nbs.sk/en/news/summary-report-on-economic-development-in-february-2010/",
        "https://nbs.sk/en/news/statement-from-the-11th-meeting-of-the-bank-board-of-the-nbs-4/",
        "https://nbs.sk/en/news/statement-from-the-10th-meeting-of-the-bank-board-of-the-nbs-3/",
        "https://nbs.sk/en/news/statement-from-the-9th-meeting-of-the-bank-board-of-the-nbs-3/",
        "https://nbs.sk/en/news/statement-from-the-8th-meeting-of-the-bank-board-of-the-nbs-2/",
        "https://nbs.sk/en/news/summary-report-on-economic-development-in-january-2010/",
        "https://nbs.sk/en/news/nbs-warning-regarding-unauthorised-activity-of-the-trading-company-plus500-ltd/",
        "https://nbs.sk/en/news/statement-from-the-44th-meeting-of-the-bank-board-of-the-nbs-2/",
    ];
}

impl Default for NbsScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper for NbsScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "Národná banka Slovenska",
            emoji: "🏦",
            region: REGION,
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        utils::host_matches(url, &self.rules.hosts)
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["nbs"]
    }

    fn start_urls(&self) -> Vec<String> {
        Self::START_URLS.iter().map(|url| url.to_string()).collect()
    }

    fn extract(&self, document: &Html, url: &str) -> ArticleRecord {
        let paragraphs = utils::outer_html(document, &self.rules.paragraph_selector);

        ArticleRecord {
            date: utils::first_raw_text(document, &[&self.rules.date_selector]),
            name: utils::first_text(document, self.rules.headline_selectors.as_slice()),
            link: url.to_string(),
            labels: utils::first_text(document, &[&self.rules.label_selector]),
            content: sanitize::assemble_content(
                paragraphs.iter().map(String::as_str),
                &self.rules,
            ),
        }
    }
}
