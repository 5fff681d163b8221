//! Page matching capability
//!
//! A thin wrapper around the scraper crate so the rest of the engine only
//! talks in terms of "match a selector, read text or an attribute". Rule
//! evaluation can then be exercised against static HTML in tests, with no
//! network in sight.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A fetched, parsed page ready for selector matching
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    /// Parses an HTML body received from the given URL
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(body),
        }
    }

    /// The URL this page was loaded from (after redirects)
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All elements matching the selector, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Element<'_>> {
        self.document.select(selector).map(Element).collect()
    }
}

/// One matched element
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// The element's text content, whitespace-trimmed
    pub fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    /// An attribute value, or the empty string when the attribute is absent
    pub fn attr(&self, name: &str) -> String {
        self.0.value().attr(name).unwrap_or("").to_string()
    }
}
