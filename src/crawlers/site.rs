use crate::extract::{ContactExtractor, PageExtraction};
use crate::fetch::{FetchError, FetchOptions, Fetcher, Renderer};
use crate::filter::UrlFilter;
use crate::frontier::{CrawlBudget, Frontier, FrontierEntry, Priority};
use crate::links::LinkExtractor;
use crate::normalize;
use crate::observer::{CrawlObserver, FetchSource};
use crate::parsers::html;
use std::sync::Arc;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Lifecycle of one site's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Pending,
    Running,
    Done,
}

/// Collaborators shared by every site crawler in a run
pub struct CrawlServices {
    pub fetcher: Arc<dyn Fetcher>,
    /// Only consulted when the HTTP fetch fails or returns a non-2xx status
    pub renderer: Option<Arc<dyn Renderer>>,
    pub contacts: ContactExtractor,
    pub links: LinkExtractor,
    pub options: FetchOptions,
    pub observer: Arc<dyn CrawlObserver>,
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl CrawlServices {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// A page that produced usable content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: Url,
    pub depth: usize,
    pub source: FetchSource,
}

/// Everything one site's crawl produced, in fetch order
#[derive(Debug)]
pub struct SiteCrawl {
    pub seed: Url,
    pub pages: Vec<PageExtraction>,
    pub fetched: Vec<FetchedPage>,
    pub urls_visited: usize,
    pub cancelled: bool,
}

/// Breadth-first crawl of a single site.
///
/// Fetching, extraction and link expansion for a page all finish before the
/// next entry is popped, so the frontier needs no locking.
pub struct SiteCrawler {
    services: Arc<CrawlServices>,
    seed: Url,
    budget: CrawlBudget,
    filter: UrlFilter,
    frontier: Frontier,
    state: CrawlState,
    pages: Vec<PageExtraction>,
    fetched: Vec<FetchedPage>,
    cancelled: bool,
}

impl SiteCrawler {
    pub fn new(
        seed: Url,
        services: Arc<CrawlServices>,
        filter: UrlFilter,
        max_depth: usize,
        max_pages: usize,
    ) -> Self {
        Self {
            budget: CrawlBudget::new(&seed, max_depth, max_pages),
            frontier: Frontier::seeded(seed.clone()),
            seed,
            services,
            filter,
            state: CrawlState::Pending,
            pages: Vec::new(),
            fetched: Vec::new(),
            cancelled: false,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn budget(&self) -> &CrawlBudget {
        &self.budget
    }

    /// Crawl until the frontier drains, the page cap is hit, or the run is cancelled
    pub async fn run(mut self) -> SiteCrawl {
        self.state = CrawlState::Running;
        self.services.observer.site_started(&self.seed, &self.budget);

        while let Some(entry) = self.next_entry() {
            self.visit(entry).await;
        }

        self.state = CrawlState::Done;
        self.services.observer.site_finished(
            &self.seed,
            self.fetched.len(),
            self.frontier.visited_len(),
        );

        SiteCrawl {
            seed: self.seed,
            pages: self.pages,
            fetched: self.fetched,
            urls_visited: self.frontier.visited_len(),
            cancelled: self.cancelled,
        }
    }

    fn next_entry(&mut self) -> Option<FrontierEntry> {
        if self.frontier.is_empty() || self.fetched.len() >= self.budget.max_pages {
            return None;
        }
        if self.services.should_stop() {
            ::log::info!(
                "Stopping crawl of {} with {} URL(s) still queued",
                self.seed,
                self.frontier.len()
            );
            self.cancelled = true;
            return None;
        }
        self.frontier.pop()
    }

    async fn visit(&mut self, entry: FrontierEntry) {
        let (body, source) = match self.load(&entry.url).await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.services.observer.page_skipped(&entry.url, &e);
                return;
            }
        };
        self.services
            .observer
            .page_fetched(&entry.url, entry.depth, source);
        self.fetched.push(FetchedPage {
            url: entry.url.clone(),
            depth: entry.depth,
            source,
        });

        let parsed = html::parse(&body);
        let mut extraction = self.services.contacts.extract(&parsed, &entry.url);

        if entry.depth < self.budget.max_depth {
            extraction.candidate_links = self.services.links.extract(&parsed, &entry.url);
            for candidate in &extraction.candidate_links {
                self.enqueue(candidate, entry.depth + 1);
            }
        }

        self.pages.push(extraction);
    }

    fn enqueue(&mut self, candidate: &Url, depth: usize) {
        if !normalize::same_domain(&self.seed, candidate) || !self.filter.should_crawl(candidate) {
            return;
        }
        let priority = Priority::for_url(candidate);
        if self.frontier.offer(candidate.clone(), depth, priority) {
            self.services.observer.link_queued(candidate, depth, priority);
        }
    }

    /// HTML for a URL, from HTTP or from the renderer when HTTP gave nothing usable
    async fn load(&self, url: &Url) -> Result<(String, FetchSource), FetchError> {
        let options = &self.services.options;

        let fetched = timeout(
            options.timeout,
            self.services
                .fetcher
                .fetch(url, options.timeout, &options.user_agent),
        )
        .await
        .unwrap_or_else(|_| Err(FetchError::timeout(url, options.timeout)));

        let failure = match fetched {
            Ok(response) if response.is_success() => {
                if options.accepts(&response.content_type) {
                    return Ok((response.text(), FetchSource::Http));
                }
                // Wrong kind of document, rendering would not change that
                return Err(FetchError::ContentType {
                    url: url.to_string(),
                    content_type: response.content_type,
                });
            }
            Ok(response) => FetchError::Status {
                url: url.to_string(),
                status: response.status,
            },
            Err(e) => e,
        };

        let Some(renderer) = &self.services.renderer else {
            return Err(failure);
        };
        ::log::debug!("Falling back to renderer for {}: {}", url, failure);

        // Session setup on first use counts against the outer bound
        let render_timeout = options.render_timeout * 2;
        match timeout(
            render_timeout,
            renderer.render(url, options.render_timeout, &options.user_agent),
        )
        .await
        {
            Ok(Ok(html)) => Ok((html, FetchSource::Renderer)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(FetchError::timeout(url, render_timeout)),
        }
    }
}
