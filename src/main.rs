// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and validate them into a CrawlRun
// 2. Set up logging (stderr, so stdout only ever carries image URLs)
// 3. Start the crawl engine as a background task
// 4. Drain its results to stdout until the cap, the idle timeout, or the
//    crawl running out of pages
// 5. Cancel whatever the engine is still doing and exit
//
// Exit codes: 0 once draining stops (for any reason), 2 for bad arguments or
// an internal error. Pages that fail to load never change the exit code.
// =============================================================================

mod cli;    // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated run settings
mod crawl;  // src/crawl/ - traversal engine, link filter, result drain
mod fetch;  // src/fetch/ - HTTP page fetching
mod parse;  // src/parse/ - HTML link and image extraction

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use config::CrawlRun;
use crawl::{drain, CrawlEngine, DrainOutcome};
use fetch::HttpFetcher;
use parse::HtmlParser;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    // --help / --version / type errors are handled (and exit) inside parse()
    let cli = Cli::parse();
    init_logging(cli.debug);

    let run = CrawlRun::try_from(cli).context("invalid arguments")?;
    info!(
        root = %run.root,
        depth = run.depth,
        max_results = run.max_results,
        idle_timeout_secs = run.idle_timeout.as_secs(),
        "starting crawl"
    );

    let fetcher = HttpFetcher::new(run.request_timeout, run.user_agent.clone())
        .context("failed to build HTTP client")?;
    let engine = CrawlEngine::new(Arc::new(fetcher), Arc::new(HtmlParser::new()));
    let cancel = CancellationToken::new();

    let (tx, mut rx) = mpsc::channel(run.channel_capacity);
    let crawl_run = run.clone();
    let crawl_cancel = cancel.clone();
    let crawler = tokio::spawn(async move { engine.crawl(&crawl_run, tx, crawl_cancel).await });

    // Lock stdout once for the whole drain instead of once per line
    let mut stdout = io::stdout().lock();
    let drained = drain(&mut rx, run.max_results, run.idle_timeout, &mut stdout).await;
    drop(stdout);

    // The drain is done either way, so in-flight fetches are no longer useful
    cancel.cancel();
    drop(rx);
    let stats = crawler.await.context("crawl task failed")?;
    let summary = drained.context("failed to write results")?;

    match summary.outcome {
        DrainOutcome::CapReached => info!(emitted = summary.emitted, "stopped at --max-links"),
        DrainOutcome::IdleTimeout => info!(
            emitted = summary.emitted,
            "stopped: no new images within the idle timeout"
        ),
        DrainOutcome::Completed => info!(emitted = summary.emitted, "crawl complete"),
    }
    debug!(
        pages_fetched = stats.pages_fetched,
        pages_failed = stats.pages_failed,
        images_found = stats.images_found,
        cancelled = stats.cancelled,
        "crawl stats"
    );

    Ok(())
}

// Logs go to stderr. RUST_LOG wins when set; otherwise only errors are shown
// unless --debug asks for everything from this crate.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new(format!("{}=debug", env!("CARGO_CRATE_NAME")))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}
