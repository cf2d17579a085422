//! Scripted in-memory collaborators for crawl tests


use crate::crawlers::site::{CrawlServices, SiteCrawl, SiteCrawler};
use crate::extract::ContactExtractor;
use crate::fetch::{FetchError, FetchOptions, FetchResponse, Fetcher, Renderer};
use crate::filter::UrlFilter;
use crate::frontier::{CrawlBudget, Priority};
use crate::links::LinkExtractor;
use crate::observer::{CrawlObserver, FetchSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Serves canned responses keyed by URL; unknown URLs get a 404
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Result<FetchResponse, FetchError>>,
    requests: Mutex<Vec<Url>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Ok(FetchResponse::html(200, body)));
        self
    }

    pub fn response(mut self, url: &str, response: Result<FetchResponse, FetchError>) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Cancel `token` once `count` requests have been served
    pub fn cancel_after(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub fn requested(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &Url,
        _timeout: Duration,
        _user_agent: &str,
    ) -> Result<FetchResponse, FetchError> {
        let served = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(url.clone());
            requests.len()
        };
        if let Some((count, token)) = &self.cancel_after {
            if served >= *count {
                token.cancel();
            }
        }
        self.responses
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(FetchResponse::html(404, "not found")))
    }
}

#[derive(Default)]
pub struct MockRenderer {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<Url>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(
        &self,
        url: &Url,
        _timeout: Duration,
        _user_agent: &str,
    ) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.clone());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::render(url, "no scripted page"))
    }
}

/// Keeps every crawl event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<Url>>,
    pub skipped: Mutex<Vec<(Url, FetchError)>>,
    pub queued: Mutex<Vec<(Url, usize, Priority)>>,
    pub finished: Mutex<Vec<(Url, usize)>>,
}

impl CrawlObserver for RecordingObserver {
    fn site_started(&self, seed: &Url, _budget: &CrawlBudget) {
        self.started.lock().unwrap().push(seed.clone());
    }

    fn page_skipped(&self, url: &Url, reason: &FetchError) {
        self.skipped
            .lock()
            .unwrap()
            .push((url.clone(), reason.clone()));
    }

    fn link_queued(&self, url: &Url, depth: usize, priority: Priority) {
        self.queued
            .lock()
            .unwrap()
            .push((url.clone(), depth, priority));
    }

    fn site_finished(&self, seed: &Url, pages_fetched: usize, _urls_visited: usize) {
        self.finished
            .lock()
            .unwrap()
            .push((seed.clone(), pages_fetched));
    }
}

pub struct Harness {
    pub fetcher: Arc<MockFetcher>,
    pub renderer: Option<Arc<MockRenderer>>,
    pub observer: Arc<RecordingObserver>,
    pub cancel: CancellationToken,
    pub deadline: Option<tokio::time::Instant>,
    pub max_links: Option<usize>,
}

impl Harness {
    pub fn new(fetcher: MockFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            renderer: None,
            observer: Arc::new(RecordingObserver::default()),
            cancel: CancellationToken::new(),
            deadline: None,
            max_links: None,
        }
    }

    pub fn with_renderer(mut self, renderer: MockRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn services(&self) -> Arc<CrawlServices> {
        Arc::new(CrawlServices {
            fetcher: self.fetcher.clone(),
            renderer: self
                .renderer
                .clone()
                .map(|r| r as Arc<dyn Renderer>),
            contacts: ContactExtractor::new(),
            links: LinkExtractor::new(self.max_links),
            options: FetchOptions {
                timeout: Duration::from_secs(5),
                render_timeout: Duration::from_secs(5),
                user_agent: "contact-crawler-test".to_string(),
                allowed_content_types: vec!["text/html".to_string()],
            },
            observer: self.observer.clone(),
            cancel: self.cancel.clone(),
            deadline: self.deadline,
        })
    }

    pub async fn crawl(&self, seed: &str, max_depth: usize, max_pages: usize) -> SiteCrawl {
        let seed = Url::parse(seed).unwrap();
        let filter = UrlFilter::for_domain(&seed);
        SiteCrawler::new(seed, self.services(), filter, max_depth, max_pages)
            .run()
            .await
    }
}

pub fn paths(crawl: &SiteCrawl) -> Vec<String> {
    crawl
        .fetched
        .iter()
        .map(|page| page.url.path().to_string())
        .collect()
}

pub fn sources(crawl: &SiteCrawl) -> Vec<FetchSource> {
    crawl.fetched.iter().map(|page| page.source).collect()
}
