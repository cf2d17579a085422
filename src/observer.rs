use crate::fetch::FetchError;
use crate::frontier::{CrawlBudget, Priority};
use url::Url;

/// How a page's HTML was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Http,
    Renderer,
}

/// Receives crawl events.
///
/// Handed to every site crawler at construction. All methods default to no-ops.
pub trait CrawlObserver: Send + Sync {
    fn site_started(&self, _seed: &Url, _budget: &CrawlBudget) {}

    fn page_fetched(&self, _url: &Url, _depth: usize, _source: FetchSource) {}

    fn page_skipped(&self, _url: &Url, _reason: &FetchError) {}

    fn link_queued(&self, _url: &Url, _depth: usize, _priority: Priority) {}

    fn site_finished(&self, _seed: &Url, _pages_fetched: usize, _urls_visited: usize) {}
}

/// Forwards crawl events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl CrawlObserver for LogObserver {
    fn site_started(&self, seed: &Url, budget: &CrawlBudget) {
        ::log::info!(
            "Crawling {} (max depth {}, max pages {})",
            seed,
            budget.max_depth,
            budget.max_pages
        );
    }

    fn page_fetched(&self, url: &Url, depth: usize, source: FetchSource) {
        match source {
            FetchSource::Http => ::log::debug!("Fetched {} (depth={})", url, depth),
            FetchSource::Renderer => {
                ::log::info!("Fetched {} via renderer (depth={})", url, depth)
            }
        }
    }

    fn page_skipped(&self, url: &Url, reason: &FetchError) {
        match reason {
            FetchError::ContentType { .. } => ::log::debug!("Skipping {}: {}", url, reason),
            _ => ::log::warn!("Skipping {}: {}", url, reason),
        }
    }

    fn link_queued(&self, url: &Url, depth: usize, priority: Priority) {
        ::log::trace!("Queuing {} at depth {} ({:?})", url, depth, priority);
    }

    fn site_finished(&self, seed: &Url, pages_fetched: usize, urls_visited: usize) {
        ::log::info!(
            "Crawled {} page(s) for {} ({} URLs seen)",
            pages_fetched,
            seed,
            urls_visited
        );
    }
}
