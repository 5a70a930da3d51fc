// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// a plain Rust struct and attributes (the #[...] things).
//
// clap only checks that values have the right *type* here (a number is a
// number). Whether the values make sense together (depth >= 1, the URL is
// http/https, ...) is checked in config.rs when we build a CrawlRun.
// =============================================================================

use clap::Parser;

// Default User-Agent sent with every request, e.g. "image-crawler/0.1.0"
pub const DEFAULT_USER_AGENT: &str = concat!("image-crawler/", env!("CARGO_PKG_VERSION"));

// This struct represents our entire CLI application
//
// Example: crawl https://example.com --depth 2 --max-links 50
#[derive(Parser, Debug, Clone)]
#[command(
    name = "crawl",
    version,
    about = "Crawl a website and print every image URL it can reach",
    long_about = "crawl follows same-host links from a seed page up to a given depth and \
                  prints one absolute image URL per line. It stops after --max-links images \
                  or once no new image has shown up for --idle-timeout seconds."
)]
pub struct Cli {
    /// Seed URL to start crawling from (e.g., https://example.com)
    pub url: String,

    /// How many levels of links should be followed
    ///
    /// Depth 1 = just the seed page
    /// Depth 2 = seed page + every same-host page it links to
    #[arg(long, default_value_t = 1)]
    pub depth: usize,

    /// Stop after printing this many image URLs
    #[arg(long = "max-links", default_value_t = 1000)]
    pub max_links: usize,

    /// Enable verbose debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Stop once no new image has been found for this many seconds
    #[arg(long = "idle-timeout", default_value_t = 5)]
    pub idle_timeout: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long = "request-timeout", default_value_t = 10)]
    pub request_timeout: u64,

    /// Maximum number of pages fetched at the same time
    #[arg(long, default_value_t = 16)]
    pub concurrency: usize,

    /// User-Agent header sent with every request
    #[arg(long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}
