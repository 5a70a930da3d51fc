// src/parse/mod.rs
// =============================================================================
// This module pulls links and images out of an HTML page.
//
// Submodules:
// - html: The scraper-backed parser used by the binary
//
// Like fetching, parsing sits behind a trait so the crawl engine does not
// care how the extraction is done.
// =============================================================================

mod html;

use url::Url;

pub use html::HtmlParser;

/// What one page points at, both lists resolved to absolute URLs and kept
/// in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub links: Vec<Url>,
    pub images: Vec<Url>,
}

/// Extracts anchor targets and image sources from an HTML document.
///
/// Parsing never fails: malformed markup yields whatever could be found.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, html: &str, base: &Url) -> ParsedPage;
}
