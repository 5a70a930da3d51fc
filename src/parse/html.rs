// src/parse/html.rs
// =============================================================================
// Extracts <a href> targets and <img> sources from HTML using `scraper`.
//
// scraper parses HTML into a DOM and lets us query it with CSS selectors,
// the same way document.querySelectorAll works in a browser. It is built on
// html5ever, so broken markup is repaired rather than rejected.
//
// Every reference is resolved to an absolute URL with the `url` crate:
//   base = "https://example.com/gallery/"
//   "cat.png"       -> "https://example.com/gallery/cat.png"
//   "/img/dog.png"  -> "https://example.com/img/dog.png"
//   "../bird.png"   -> "https://example.com/bird.png"
// A <base href> in the document, when present, replaces the page URL as the
// base for resolution.
//
// Rust concepts:
// - Iterators: select() yields matching elements lazily
// - Option: A missing or unparseable attribute is just skipped
// - ? on Option: srcset falls back to its first candidate, or nothing
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use tracing::trace;
use url::Url;

use super::{DocumentParser, ParsedPage};

pub struct HtmlParser {
    anchors: Selector,
    images: Selector,
    base: Selector,
}

impl HtmlParser {
    pub fn new() -> Self {
        // These selectors are constants and known to be valid, so a failure
        // here is a programmer error rather than something to recover from.
        Self {
            anchors: Selector::parse("a[href]").expect("valid anchor selector"),
            images: Selector::parse("img").expect("valid image selector"),
            base: Selector::parse("base[href]").expect("valid base selector"),
        }
    }

    // <base href="..."> changes what relative URLs are resolved against
    fn effective_base(&self, document: &Html, page_url: &Url) -> Url {
        document
            .select(&self.base)
            .next()
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok())
            .unwrap_or_else(|| page_url.clone())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for HtmlParser {
    fn parse(&self, html: &str, page_url: &Url) -> ParsedPage {
        let document = Html::parse_document(html);
        let base = self.effective_base(&document, page_url);

        let links = document
            .select(&self.anchors)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_reference(&base, href))
            .collect();

        let images = document
            .select(&self.images)
            .filter_map(image_source)
            .filter_map(|src| resolve_reference(&base, src))
            .filter(|url| url.scheme() == "http" || url.scheme() == "https")
            .collect();

        ParsedPage { links, images }
    }
}

// Picks the URL an <img> would load: `src`, or else the first `srcset`
// candidate ("a.png 1x, b.png 2x" -> "a.png").
fn image_source<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let img = element.value();
    if let Some(src) = img.attr("src").filter(|s| !s.trim().is_empty()) {
        return Some(src);
    }
    img.attr("srcset")?
        .split(',')
        .next()?
        .split_whitespace()
        .next()
}

// Resolves a possibly-relative reference against the base URL.
//
// Returns None for references that never point at another resource:
// empty values, in-page anchors, and inline/script pseudo-URLs.
fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || reference.starts_with("javascript:")
        || reference.starts_with("mailto:")
        || reference.starts_with("tel:")
    {
        return None;
    }

    match base.join(reference) {
        Ok(url) => Some(url),
        Err(e) => {
            trace!(%base, reference, error = %e, "skipping unresolvable reference");
            None
        }
    }
}
