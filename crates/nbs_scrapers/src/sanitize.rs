//! Paragraph cleaning and body assembly.
//!
//! Paragraphs are cleaned by collecting every text node below the fragment
//! root, so nested inline markup (`<em>`, `<a>`, `<span>`...) never hides
//! text. Parsing goes through html5ever, which recovers from broken markup,
//! so cleaning cannot fail.

use lazy_static::lazy_static;
use nbs_core::SiteRules;
use regex::Regex;
use scraper::{Html, Selector};

lazy_static! {
    // Decoded entities such as `&lt;b&gt;` come back as tag-looking text.
    static ref RESIDUAL_TAG: Regex = Regex::new(r"<[^<>]*>").unwrap();
}

const BOLD_SELECTOR: &str = "strong, b";

/// Returns the plain text of one paragraph's raw markup.
pub fn clean_paragraph(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text = parsed.root_element().text().collect::<String>();
    RESIDUAL_TAG
        .replace_all(&text, "")
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect()
}

/// True when the raw paragraph markup marks the end of the article body.
pub fn contains_stop_marker(fragment: &str, rules: &SiteRules) -> bool {
    if contains_stop_literal(fragment, rules) {
        return true;
    }
    rules.stop_on_bold && contains_bold(fragment)
}

fn contains_stop_literal(text: &str, rules: &SiteRules) -> bool {
    rules
        .stop_literals
        .iter()
        .any(|literal| !literal.is_empty() && text.contains(literal.as_str()))
}

fn contains_bold(fragment: &str) -> bool {
    let parsed = Html::parse_fragment(fragment);
    match Selector::parse(BOLD_SELECTOR) {
        Ok(selector) => parsed.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// Concatenates the cleaned paragraphs up to, not including, the first one
/// carrying a stop marker.
pub fn assemble_content<'a, I>(paragraphs: I, rules: &SiteRules) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut content = String::new();
    for raw in paragraphs {
        if contains_stop_marker(raw, rules) {
            break;
        }
        let cleaned = clean_paragraph(raw);
        // An entity-encoded literal only shows up once decoded.
        if contains_stop_literal(&cleaned, rules) {
            break;
        }
        let start = content.len();
        content.push_str(&cleaned);
        // Joining without a separator can splice a literal across paragraphs.
        if contains_stop_literal(&content, rules) {
            content.truncate(start);
            break;
        }
    }
    content
}
