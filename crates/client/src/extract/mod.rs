//! HTML to (title, text) extraction.
//!
//! ### Title
//! - First `<title>` element, case-insensitive, attributes and newlines allowed.
//! - Entity-decoded and trimmed; empty when the document has none.
//!
//! ### Text
//! - Main readable content through the `Extractor` trait; the default
//!   [`ReadableExtractor`] runs Readability and drops page chrome.
//! - When the extractor fails or finds nothing, a tag-stripping pass over the
//!   raw document is used instead.
//!
//! Extraction never does I/O and never fails: empty or non-HTML input yields
//! empty strings.

pub mod readable;
pub mod strip;

pub use readable::ReadableExtractor;
pub use strip::{collapse_whitespace, strip_tags};

use aetherforge_core::Error;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("invalid title regex"));

/// Title and body text derived from an HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    pub title: String,
    pub text: String,
}

/// Stable extractor trait for main-content extraction.
///
/// This allows swapping the extraction engine without changing the fetcher.
pub trait Extractor: Send + Sync {
    /// Return the readable body text of `html`, or an error when no main
    /// content could be identified.
    fn extract_text(&self, html: &str, source_url: Option<&str>) -> Result<String, Error>;
}

/// Extract title and text with the default [`ReadableExtractor`].
pub fn extract(html: &str, source_url: Option<&str>) -> Extracted {
    extract_with(&ReadableExtractor::new(), html, source_url)
}

/// Extract title and text using `extractor` for the body, falling back to
/// [`strip_tags`] when it errors or returns nothing.
pub fn extract_with(extractor: &dyn Extractor, html: &str, source_url: Option<&str>) -> Extracted {
    let title = extract_title(html);

    let text = match extractor.extract_text(html, source_url) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::debug!(source_url, "extractor returned no text, stripping tags");
            strip_tags(html)
        }
        Err(e) => {
            tracing::debug!(source_url, "extractor failed ({e}), stripping tags");
            strip_tags(html)
        }
    };

    Extracted { title, text }
}

/// Contents of the first `<title>` element, entity-decoded and trimmed.
pub fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str()).trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <html>
          <head><title>Test Page</title></head>
          <body>
            <article>
              <h1>Hello World</h1>
              <p>This is a tiny sample paragraph used for testing.</p>
            </article>
          </body>
        </html>
    "#;

    struct FailingExtractor;

    impl Extractor for FailingExtractor {
        fn extract_text(&self, _html: &str, _source_url: Option<&str>) -> Result<String, Error> {
            Err(Error::ExtractFailed("boom".into()))
        }
    }

    #[test]
    fn test_extract_title_and_text() {
        let out = extract(SAMPLE_HTML, Some("https://example.com"));
        assert!(out.title.contains("Test Page"));
        assert!(out.text.contains("Hello World"));
        assert!(out.text.contains("sample paragraph"));
    }

    #[test]
    fn test_headline_in_article_header_is_kept() {
        let html = r#"
            <html><head><title>Test Page</title></head><body>
              <article>
                <header><h1>Hello World</h1></header>
                <p>This is a tiny sample paragraph used for testing.</p>
              </article>
            </body></html>
        "#;

        let out = extract(html, Some("https://example.com/post"));
        assert!(out.text.contains("Hello World"));
        assert!(out.text.contains("sample paragraph"));
    }

    #[test]
    fn test_teaser_card_does_not_replace_main_story() {
        let html = r#"
            <html><head><title>Daily</title></head><body>
              <main>
                <p>The real story is told in this paragraph, which carries the substance of the page.</p>
                <article><a href="/other">Related: other story</a></article>
              </main>
            </body></html>
        "#;

        let out = extract(html, Some("https://example.com/daily"));
        assert!(out.text.contains("The real story is told in this paragraph"));
    }

    #[test]
    fn test_extract_is_deterministic() {
        assert_eq!(extract(SAMPLE_HTML, None), extract(SAMPLE_HTML, None));
    }

    #[test]
    fn test_title_case_insensitive_with_attributes() {
        let html = "<HEAD><TITLE lang=\"en\">\n  Fish &amp; Chips\n</TITLE></HEAD>";
        assert_eq!(extract_title(html), "Fish & Chips");
    }

    #[test]
    fn test_title_missing() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), "");
    }

    #[test]
    fn test_title_uses_first_occurrence() {
        let html = "<title>First</title><svg><title>Second</title></svg>";
        assert_eq!(extract_title(html), "First");
    }

    #[test]
    fn test_fallback_on_extractor_error() {
        let html = "<html><body><script>var x = 1;</script><p>Kept  text</p></body></html>";
        let out = extract_with(&FailingExtractor, html, None);
        assert_eq!(out.text, "Kept text");
    }

    #[test]
    fn test_empty_input() {
        let out = extract("", None);
        assert_eq!(out, Extracted::default());
    }

    #[test]
    fn test_plain_text_input() {
        let out = extract("just some words", None);
        assert_eq!(out.title, "");
        assert_eq!(out.text, "just some words");
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let out = extract("<div><p>Unclosed <b>bold <i>text</div", None);
        assert!(out.text.contains("Unclosed"));
        assert!(out.text.contains("text"));
    }
}
