// src/fetch/http.rs
// =============================================================================
// The real PageFetcher: plain GET requests through a shared reqwest Client.
//
// Key functionality:
// - One Client for the whole run (connection pooling)
// - Follows up to 5 redirects, but only within the same host
// - Only accepts 2xx responses with an HTML content-type
// - Sorts reqwest failures into FetchError variants for nicer log lines
//
// Rust concepts:
// - async/await: For network I/O that doesn't block other fetches
// - Closures: The redirect policy is a closure reqwest calls per hop
// - ? operator: Converts reqwest::Error into FetchError via From
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{FetchError, FetchedPage, PageFetcher};

const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    // Builds the HTTP client. This is the only place reqwest can fail before
    // the crawl starts (e.g. the TLS backend cannot be initialised).
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(same_host_redirects())
            .build()?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, &self.user_agent)
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        if status.is_redirection() {
            // The redirect policy only hands back a 3xx when Location leaves
            // the host
            let target = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| final_url.join(loc).ok())
                .unwrap_or_else(|| final_url.clone());
            return Err(FetchError::OffHost(target));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A missing content-type is given the benefit of the doubt; the
        // parser is permissive and will just find nothing in non-HTML.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type {
            if !is_html(&content_type) {
                return Err(FetchError::NotHtml(content_type));
            }
        }

        let body = response.text().await.map_err(categorize_error)?;
        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}

// Follows redirects on the original host only. A hop to another host is not
// followed; the 3xx response comes back to fetch() instead.
fn same_host_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !redirect_stays_on_host(attempt.previous(), attempt.url()) {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

fn redirect_stays_on_host(chain: &[Url], next: &Url) -> bool {
    match chain.first() {
        Some(origin) => origin.host_str() == next.host_str(),
        None => true,
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

// Sorts reqwest errors into the handful of cases worth telling apart in logs
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Request(error)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why build one Client and reuse it?
//    - A Client holds a connection pool
//    - Reusing it means pages on the same host share TCP/TLS connections
//    - Client is cheap to clone; clones share the same pool
//
// 2. How does Policy::custom work?
//    - reqwest calls the closure before following each redirect
//    - attempt.previous() is the list of URLs visited so far
//    - follow() goes on, stop() returns the 3xx response as-is,
//      error() turns the request into an error
//
// 3. Why is response.url() different from the URL we asked for?
//    - After redirects it is the URL that actually served the body
//    - Relative links in that body are relative to it, not to the original
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_content_types() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("TEXT/HTML"));
        assert!(is_html("application/xhtml+xml"));
    }

    #[test]
    fn test_non_html_content_types() {
        assert!(!is_html("image/png"));
        assert!(!is_html("application/json"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_redirect_within_host_followed() {
        let chain = vec![Url::parse("http://a.test/docs").unwrap()];
        let next = Url::parse("http://a.test/docs/").unwrap();
        assert!(redirect_stays_on_host(&chain, &next));
    }

    #[test]
    fn test_redirect_to_other_host_stopped() {
        let chain = vec![
            Url::parse("http://a.test/go").unwrap(),
            Url::parse("http://a.test/go2").unwrap(),
        ];
        let next = Url::parse("http://b.test/landing").unwrap();
        assert!(!redirect_stays_on_host(&chain, &next));
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(1), "test-agent").is_ok());
    }
}
