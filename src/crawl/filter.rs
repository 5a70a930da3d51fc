// src/crawl/filter.rs
// =============================================================================
// Decides whether a link should be crawled.
//
// A link is followed only if:
// 1. It resolves to an http/https URL
// 2. It is on the same host as the page it was found on
// 3. Its normalized form (query and fragment stripped) has never been seen
//
// Step 3 is a single check-and-insert under a mutex. Several visit tasks call
// should_visit at the same time; for any one URL exactly one of them wins.
//
// Rust concepts:
// - Arc<Mutex<T>>: Shared, mutable state across tasks
// - Clone: Cheap handle copies that point at the same set
// - HashSet::insert: Returns false when the value was already there
// =============================================================================

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// Run-scoped link filter. Cloning shares the same visited set.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    visited: Arc<Mutex<HashSet<String>>>,
}

impl LinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a same-host `to` (resolved against
    /// `from`) is seen, false for every later call and for any link that
    /// leaves the host.
    pub fn should_visit(&self, from: &Url, to: &str) -> bool {
        let Ok(target) = from.join(to) else {
            return false;
        };

        if target.scheme() != "http" && target.scheme() != "https" {
            return false;
        }
        if target.host_str() != from.host_str() {
            return false;
        }

        let key = normalize(&target).to_string();
        self.lock().insert(key)
    }

    /// Number of distinct URLs dispatched so far.
    pub fn visited_count(&self) -> usize {
        self.lock().len()
    }

    // A panic in another task while holding the lock cannot leave the set
    // half-updated (insert is all or nothing), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.visited.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Strips query and fragment so `/p?x=1` and `/p?x=2#top` count as one page.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    normalized
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why insert first and check the result?
//    - "if !set.contains(x) { set.insert(x) }" is two steps
//    - Another task can slip in between them and both would crawl the page
//    - insert() does both in one step and tells us whether we were first
//
// 2. What does a poisoned Mutex mean?
//    - If a thread panics while holding the lock, the Mutex is marked poisoned
//    - The data inside is still a valid HashSet, so we keep using it
//    - into_inner() on the PoisonError gives the guard back
//
// 3. Why strip the query string?
//    - "/gallery?page=2" and "/gallery?page=3" usually render the same images
//    - Treating them as one page keeps the crawl from looping over pagination
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_first_visit_wins() {
        let filter = LinkFilter::new();
        let root = url("http://x/");
        assert!(filter.should_visit(&root, "http://x/p"));
        assert!(!filter.should_visit(&root, "http://x/p"));
        assert_eq!(filter.visited_count(), 1);
    }

    #[test]
    fn test_query_string_stripped() {
        let filter = LinkFilter::new();
        let root = url("http://x/");
        assert!(filter.should_visit(&root, "http://x/p?x=1"));
        assert!(!filter.should_visit(&root, "http://x/p?x=2"));
        assert!(!filter.should_visit(&root, "/p#section"));
    }

    #[test]
    fn test_cross_host_rejected() {
        let filter = LinkFilter::new();
        let a = url("http://a/");
        assert!(!filter.should_visit(&a, "http://b/"));
        // rejected every time, and never recorded as visited
        assert!(!filter.should_visit(&a, "http://b/"));
        assert_eq!(filter.visited_count(), 0);
    }

    #[test]
    fn test_relative_link_resolved_against_page() {
        let filter = LinkFilter::new();
        let page = url("http://x/docs/index.html");
        assert!(filter.should_visit(&page, "intro.html"));
        assert!(!filter.should_visit(&page, "http://x/docs/intro.html"));
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        let filter = LinkFilter::new();
        let page = url("http://x/");
        assert!(!filter.should_visit(&page, "mailto:someone@x"));
        assert!(!filter.should_visit(&page, "ftp://x/file"));
    }

    #[test]
    fn test_seed_marks_itself() {
        let filter = LinkFilter::new();
        let root = url("http://x/");
        assert!(filter.should_visit(&root, root.as_str()));
        assert!(!filter.should_visit(&root, "/"));
    }

    #[test]
    fn test_clones_share_visited_set() {
        let filter = LinkFilter::new();
        let other = filter.clone();
        let root = url("http://x/");
        assert!(filter.should_visit(&root, "/a"));
        assert!(!other.should_visit(&root, "/a"));
    }

    #[test]
    fn test_concurrent_callers_only_one_wins() {
        let filter = LinkFilter::new();
        let root = url("http://x/");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let filter = filter.clone();
                let root = root.clone();
                std::thread::spawn(move || filter.should_visit(&root, "/same?n=1"))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_normalize() {
        let normalized = normalize(&url("https://x/a/b?q=1#frag"));
        assert_eq!(normalized.as_str(), "https://x/a/b");
    }
}
