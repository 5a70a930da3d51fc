// src/config.rs
// =============================================================================
// Turns the raw command-line arguments into a validated CrawlRun.
//
// A CrawlRun is built once at startup and never changes afterwards. Anything
// wrong with the arguments is a ConfigError and stops the program before a
// single request is sent.
// =============================================================================

use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;

// Capacity of the result channel between the engine and the drain.
// Producers wait (backpressure) once this many images are queued.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported scheme '{0}': only http and https can be crawled")]
    UnsupportedScheme(String),

    #[error("--depth must be at least 1")]
    ZeroDepth,

    #[error("--max-links must be at least 1")]
    ZeroMaxResults,

    #[error("--concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("--idle-timeout must be at least 1 second")]
    ZeroIdleTimeout,

    #[error("--request-timeout must be at least 1 second")]
    ZeroRequestTimeout,
}

/// Everything one crawl needs to know, read-only for the run's lifetime.
#[derive(Debug, Clone)]
pub struct CrawlRun {
    /// Seed page.
    pub root: Url,
    /// Levels of pages to visit; 1 means only the root.
    pub depth: usize,
    /// Hard cap on images handed to the drain's output.
    pub max_results: usize,
    /// How long the drain waits for the next image before giving up.
    pub idle_timeout: Duration,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
    pub channel_capacity: usize,
    pub user_agent: String,
}

impl CrawlRun {
    /// Builds a run with defaults for everything but the seed and depth.
    pub fn new(root: Url, depth: usize) -> Self {
        Self {
            root,
            depth,
            max_results: 1000,
            idle_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            max_concurrency: 16,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            user_agent: crate::cli::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TryFrom<Cli> for CrawlRun {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let root = parse_seed(&cli.url)?;

        if cli.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if cli.max_links == 0 {
            return Err(ConfigError::ZeroMaxResults);
        }
        if cli.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if cli.idle_timeout == 0 {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        if cli.request_timeout == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }

        Ok(Self {
            max_results: cli.max_links,
            idle_timeout: Duration::from_secs(cli.idle_timeout),
            request_timeout: Duration::from_secs(cli.request_timeout),
            max_concurrency: cli.concurrency,
            user_agent: cli.user_agent,
            ..Self::new(root, cli.depth)
        })
    }
}

// The seed must be an absolute http(s) URL. The url crate refuses http(s)
// URLs without a host, so passing the scheme check means a host is present
// for the same-host rule to compare against.
fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["crawl"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_valid_run() {
        let run = CrawlRun::try_from(cli(&["https://example.com/start", "--depth", "2"])).unwrap();
        assert_eq!(run.root.as_str(), "https://example.com/start");
        assert_eq!(run.depth, 2);
        assert_eq!(run.max_results, 1000);
        assert_eq!(run.idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = CrawlRun::try_from(cli(&["https://example.com", "--depth", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroDepth);
    }

    #[test]
    fn test_zero_max_links_rejected() {
        let err =
            CrawlRun::try_from(cli(&["https://example.com", "--max-links", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroMaxResults);
    }

    #[test]
    fn test_relative_url_rejected() {
        let err = CrawlRun::try_from(cli(&["/just/a/path"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = CrawlRun::try_from(cli(&["ftp://example.com/"])).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedScheme("ftp".to_string()));
    }

    #[test]
    fn test_host_less_seed_rejected() {
        for seed in ["http://", "http:"] {
            let err = CrawlRun::try_from(cli(&[seed])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidUrl { .. }), "{seed}: {err:?}");
        }
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let err = CrawlRun::try_from(cli(&["https://example.com", "--request-timeout", "0"]))
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroRequestTimeout);
    }

    #[test]
    fn test_zero_idle_timeout_rejected() {
        let err =
            CrawlRun::try_from(cli(&["https://example.com", "--idle-timeout", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroIdleTimeout);
    }
}
