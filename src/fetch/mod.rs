// src/fetch/mod.rs
// =============================================================================
// This module turns a URL into an HTML string.
//
// The crawl engine only talks to the PageFetcher trait, never to reqwest
// directly. That keeps the engine testable: tests hand it an in-memory
// fetcher that serves canned pages instead of going over the network.
//
// Submodules:
// - http: The real fetcher, backed by a reqwest Client
// =============================================================================

mod http;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub use http::HttpFetcher;

// Everything that can go wrong fetching a single page.
//
// None of these stop the crawl: the engine logs them and drops that one
// branch of the traversal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("not an HTML page (content-type: {0})")]
    NotHtml(String),

    #[error("redirected off-host to {0}")]
    OffHost(Url),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// A fetched HTML document and the URL it was finally served from.
///
/// `url` differs from the requested URL when the server redirected, e.g.
/// `/docs` -> `/docs/`. Relative references must be resolved against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

/// Fetches the HTML body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The engine holds an Arc<dyn PageFetcher>
//    - Production passes HttpFetcher, tests pass a fake backed by a HashMap
//    - No network in unit tests means they are fast and never flaky
//
// 2. What is #[async_trait]?
//    - It lets a trait have async fn methods that work with dyn Trait
//    - Under the hood each call returns a boxed future
//
// 3. What does thiserror do?
//    - #[error("...")] writes the Display impl for each variant
//    - #[from] writes a From impl, so ? converts reqwest errors for us
// -----------------------------------------------------------------------------
