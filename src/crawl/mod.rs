// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Submodules:
// - filter: Same-host check and visited-set dedup for candidate links
// - engine: Concurrent depth-limited traversal that sends out image URLs
// - drain:  Consumer side that prints results until a stop condition
//
// The engine and the drain only share a bounded tokio mpsc channel of
// ImageResults: the engine produces, the drain consumes.
// =============================================================================

mod drain;
mod engine;
mod filter;

use std::fmt;
use url::Url;

pub use drain::{drain, DrainOutcome};
pub use engine::CrawlEngine;

/// An absolute URL of an image found on a crawled page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageResult(String);

impl ImageResult {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Url> for ImageResult {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl fmt::Display for ImageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
