//! Main-content extraction backed by `readabilityrs`.
//!
//! Readability picks the article container and drops page chrome. Its
//! cleaned HTML is then flattened to text here: block elements end a line,
//! inline elements are separated by a space, and blank lines are dropped.

use super::strip::collapse_whitespace;
use super::{Extractor, extract_title};
use aetherforge_core::Error;
use readabilityrs::Readability;
use scraper::{ElementRef, Html, Node};

/// Elements whose subtree never contributes text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Elements that end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p", "pre", "section", "table", "td", "th", "tr",
    "ul",
];

/// Readability-based extractor.
#[derive(Debug, Default, Clone)]
pub struct ReadableExtractor;

impl ReadableExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ReadableExtractor {
    fn extract_text(&self, html: &str, source_url: Option<&str>) -> Result<String, Error> {
        let article = Readability::new(html, source_url, None)
            .or_else(|_| Readability::new(html, None, None))
            .ok()
            .and_then(|readability| readability.parse())
            .ok_or_else(|| Error::ExtractFailed("no readable article".into()))?;

        let mut text = match article.content.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(content) => html_to_text(content),
            None => article.text_content.as_deref().map(normalize_lines).unwrap_or_default(),
        };

        if text.is_empty() {
            return Err(Error::ExtractFailed("no readable content".into()));
        }

        // Readability lifts the headline out of the body when it uses it as
        // the article title; the page title comes from <title>, so keep it.
        if let Some(headline) = article.title.as_deref().map(collapse_whitespace)
            && !headline.is_empty()
            && !text.contains(&headline)
            && headline != extract_title(html)
        {
            text = format!("{headline}\n{text}");
        }

        tracing::trace!(source_url, chars = text.len(), "extracted main content");
        Ok(text)
    }
}

/// Flatten an HTML fragment to newline-separated blocks of text.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();
    collect_text(fragment.root_element(), &mut raw);
    normalize_lines(&raw)
}

fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let separator = if BLOCK_TAGS.contains(&name) { '\n' } else { ' ' };
                out.push(separator);
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                out.push(separator);
            }
            _ => {}
        }
    }
}
