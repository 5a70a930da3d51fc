// src/crawl/engine.rs
// =============================================================================
// The traversal engine: walks same-host links from a seed page and sends
// every image it finds into a channel.
//
// How it works:
// 1. Mark the seed as visited and put it in the frontier
// 2. Each frontier entry becomes its own task on a JoinSet:
//      fetch -> parse -> filter links -> send images
// 3. A finished task hands back the links it accepted; each one becomes a
//    new task with one less level of depth
// 4. When the JoinSet is empty, every page has been handled. crawl() returns
//    and drops its Sender, which closes the channel for the drain
//
// Sibling pages are fetched concurrently; a semaphore caps how many requests
// are in flight at once. The caller passes a CancellationToken with each run
// to stop it early, e.g. once the drain has printed enough results.
//
// Pages are parsed against the URL they were finally served from, so a
// redirect from /docs to /docs/ resolves relative links correctly, and a
// page that ended up on another host is dropped.
//
// Rust concepts:
// - JoinSet: A set of spawned tasks we can await one at a time
// - Arc<dyn Trait>: Shared ownership of a trait object across tasks
// - tokio::select!: Wait on whichever of several futures finishes first
// =============================================================================

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::filter::{normalize, LinkFilter};
use super::ImageResult;
use crate::config::CrawlRun;
use crate::fetch::PageFetcher;
use crate::parse::DocumentParser;

/// A page waiting to be crawled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    /// Levels left including this page; links are only followed while > 1.
    pub depth_remaining: usize,
}

/// Totals reported when a crawl finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub images_found: usize,
    pub cancelled: bool,
}

// How a single page visit ended
#[derive(Debug)]
enum VisitOutcome {
    Visited {
        children: Vec<FrontierEntry>,
        images: usize,
    },
    Failed,
    // Cancelled mid-visit, or the drain hung up
    Stopped,
}

/// Holds the fetch and parse capabilities. All per-run state (visited set,
/// concurrency limit, cancellation) is created by each `crawl` call, so one
/// engine can run any number of crawls.
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn DocumentParser>,
}

// Everything a visit task needs, cheap to clone into each spawned task
#[derive(Clone)]
struct VisitContext {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn DocumentParser>,
    filter: LinkFilter,
    root_host: Option<String>,
    limiter: Arc<Semaphore>,
    sink: mpsc::Sender<ImageResult>,
    cancel: CancellationToken,
}

impl CrawlEngine {
    pub fn new(fetcher: Arc<dyn PageFetcher>, parser: Arc<dyn DocumentParser>) -> Self {
        Self { fetcher, parser }
    }

    /// Crawls from `run.root` down to `run.depth` levels, sending images to
    /// `sink` as they are found.
    ///
    /// Returns once every reachable page has been handled or `cancel` fired.
    /// Dropping `sink` on return is what tells the receiver that no more
    /// images will come.
    pub async fn crawl(
        &self,
        run: &CrawlRun,
        sink: mpsc::Sender<ImageResult>,
        cancel: CancellationToken,
    ) -> CrawlStats {
        let mut stats = CrawlStats::default();
        if run.depth == 0 {
            return stats;
        }

        // A fresh visited set per run, so separate runs never share state.
        let filter = LinkFilter::new();
        filter.should_visit(&run.root, run.root.as_str());

        let ctx = VisitContext {
            fetcher: Arc::clone(&self.fetcher),
            parser: Arc::clone(&self.parser),
            filter: filter.clone(),
            root_host: run.root.host_str().map(str::to_string),
            limiter: Arc::new(Semaphore::new(run.max_concurrency.max(1))),
            sink,
            cancel: cancel.clone(),
        };

        let mut frontier = JoinSet::new();
        frontier.spawn(visit_page(
            ctx.clone(),
            FrontierEntry {
                url: run.root.clone(),
                depth_remaining: run.depth,
            },
        ));

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                joined = frontier.join_next() => Some(joined),
            };

            let Some(joined) = next else {
                stats.cancelled = true;
                frontier.shutdown().await;
                break;
            };

            // None means the frontier is empty: all work is done
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(VisitOutcome::Visited { children, images }) => {
                    stats.pages_fetched += 1;
                    stats.images_found += images;
                    for child in children {
                        frontier.spawn(visit_page(ctx.clone(), child));
                    }
                }
                Ok(VisitOutcome::Failed) => stats.pages_failed += 1,
                Ok(VisitOutcome::Stopped) => {
                    // Nobody is listening any more; stop the other branches too
                    cancel.cancel();
                }
                Err(e) => {
                    warn!(error = %e, "page visit task did not complete");
                    stats.pages_failed += 1;
                }
            }
        }

        debug!(
            root = %run.root,
            pages_fetched = stats.pages_fetched,
            pages_failed = stats.pages_failed,
            images_found = stats.images_found,
            urls_dispatched = filter.visited_count(),
            cancelled = stats.cancelled,
            "crawl finished"
        );
        stats
    }
}

// Fetching -> Parsing -> Filtering -> Emitting for a single page
async fn visit_page(ctx: VisitContext, entry: FrontierEntry) -> VisitOutcome {
    debug!(url = %entry.url, depth_remaining = entry.depth_remaining, "fetching page");

    let fetched = {
        // The permit only covers the network request, not parsing or sending
        let Ok(_permit) = ctx.limiter.acquire().await else {
            return VisitOutcome::Stopped;
        };
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return VisitOutcome::Stopped,
            fetched = ctx.fetcher.fetch(&entry.url) => fetched,
        }
    };

    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(url = %entry.url, error = %e, "failed to fetch page");
            return VisitOutcome::Failed;
        }
    };

    if fetched.url.host_str() != ctx.root_host.as_deref() {
        warn!(url = %entry.url, final_url = %fetched.url, "redirected off-host, skipping page");
        return VisitOutcome::Failed;
    }

    // A redirect onto a page some other branch already claimed is a duplicate
    if normalize(&fetched.url) != normalize(&entry.url)
        && !ctx.filter.should_visit(&fetched.url, fetched.url.as_str())
    {
        debug!(url = %entry.url, final_url = %fetched.url, "redirect target already visited");
        return VisitOutcome::Visited {
            children: Vec::new(),
            images: 0,
        };
    }

    let page_url = fetched.url;
    let page = ctx.parser.parse(&fetched.body, &page_url);
    debug!(
        url = %page_url,
        links = page.links.len(),
        images = page.images.len(),
        "parsed page"
    );

    let mut children = Vec::new();
    if entry.depth_remaining > 1 {
        for link in &page.links {
            if ctx.filter.should_visit(&page_url, link.as_str()) {
                children.push(FrontierEntry {
                    url: link.clone(),
                    depth_remaining: entry.depth_remaining - 1,
                });
            }
        }
    }

    let images = page.images.len();
    for image in page.images {
        // Waits while the channel is full; fails only once the drain is gone
        if ctx.sink.send(ImageResult::from(image)).await.is_err() {
            debug!(url = %page_url, "result channel closed, stopping");
            return VisitOutcome::Stopped;
        }
    }

    VisitOutcome::Visited { children, images }
}
