// src/crawl/drain.rs
// =============================================================================
// Reads image URLs off the result channel and writes them out, one per line.
//
// Draining stops for one of three reasons:
// - CapReached:  max_results images have been written
// - IdleTimeout: nothing new arrived within idle_timeout
// - Completed:   the channel closed because the crawl ran out of pages
//
// The drain does not wait for the crawl to finish. Stopping the crawl once
// the drain is done is the caller's job (see main.rs).
//
// Rust concepts:
// - Generics: drain writes to any io::Write (stdout, or a Vec<u8> in tests)
// - tokio::time::timeout: Gives up on a future after a deadline
// - Enums: DrainOutcome says why we stopped
// =============================================================================

use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::ImageResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    CapReached,
    IdleTimeout,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    pub emitted: usize,
    pub outcome: DrainOutcome,
}

/// Writes results to `out` in arrival order until one of the stop
/// conditions hits. Only a failing writer is an error.
pub async fn drain<W: Write>(
    rx: &mut mpsc::Receiver<ImageResult>,
    max_results: usize,
    idle_timeout: Duration,
    out: &mut W,
) -> io::Result<DrainSummary> {
    let mut emitted = 0;

    let outcome = loop {
        if emitted >= max_results {
            break DrainOutcome::CapReached;
        }

        match timeout(idle_timeout, rx.recv()).await {
            Ok(Some(image)) => {
                writeln!(out, "{}", image.as_str())?;
                out.flush()?;
                emitted += 1;
            }
            Ok(None) => break DrainOutcome::Completed,
            Err(_) => break DrainOutcome::IdleTimeout,
        }
    };

    Ok(DrainSummary { emitted, outcome })
}
