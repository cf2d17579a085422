pub mod aggregate;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod frontier;
pub mod input;
pub mod links;
pub mod normalize;
pub mod observer;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::CrawlerConfig;
pub use error::{Error, Result};
pub use results::{ContactRecord, SiteReport};

use aggregate::Aggregator;
use chrono::Utc;
use crawlers::{CrawlServices, HttpFetcher, SiteCrawl, SiteCrawler, WebDriverRenderer};
use extract::ContactExtractor;
use fetch::{Fetcher, Renderer};
use filter::UrlFilter;
use links::LinkExtractor;
use observer::{CrawlObserver, LogObserver};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Crawls a list of seed sites and turns what it finds into contact records.
///
/// Sites run in parallel up to `max_concurrency`; reports come back in seed
/// order whatever order the sites finish in.
pub struct ContactCrawler {
    config: CrawlerConfig,
    fetcher: Arc<dyn Fetcher>,
    renderer: Option<Arc<dyn Renderer>>,
    observer: Arc<dyn CrawlObserver>,
    cancel: CancellationToken,
}

impl ContactCrawler {
    /// Crawler with the reqwest fetcher, plus the WebDriver renderer when
    /// `use_dynamic_fallback` is set
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.proxy.as_deref())?;
        let renderer = config
            .use_dynamic_fallback
            .then(|| Arc::new(WebDriverRenderer::new(&config.webdriver_url)) as Arc<dyn Renderer>);

        let mut crawler = Self::from_parts(config, Arc::new(fetcher));
        crawler.renderer = renderer;
        Ok(crawler)
    }

    /// Crawler around any fetcher, with no renderer
    pub fn from_parts(config: CrawlerConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            fetcher,
            renderer: None,
            observer: Arc::new(LogObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancelling this token stops every site before its next fetch
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Normalize seeds, dropping invalid ones with a warning and repeats silently
    pub fn prepare_seeds(seeds: &[String]) -> Vec<Url> {
        let valid = seeds.iter().filter_map(|raw| match normalize::normalize_seed(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                ::log::warn!("Skipping seed: {}", e);
                None
            }
        });
        utils::dedupe_preserve_order(valid)
    }

    fn services(&self) -> Arc<CrawlServices> {
        let deadline = self
            .config
            .run_timeout()
            .map(|limit| tokio::time::Instant::now() + limit);

        Arc::new(CrawlServices {
            fetcher: self.fetcher.clone(),
            renderer: self.renderer.clone(),
            contacts: ContactExtractor::with_phone_regions(&self.config.regions_for_phones),
            links: LinkExtractor::new(self.config.max_links_per_page),
            options: self.config.fetch_options(),
            observer: self.observer.clone(),
            cancel: self.cancel.clone(),
            deadline,
        })
    }

    fn site_crawler(&self, seed: Url, services: Arc<CrawlServices>) -> Result<SiteCrawler> {
        let filter = UrlFilter::new(
            &seed,
            &self.config.include_patterns,
            &self.config.exclude_patterns,
        )
        .map_err(|e| Error::invalid_input("URL filter pattern", e.to_string()))?;

        Ok(SiteCrawler::new(
            seed,
            services,
            filter,
            self.config.max_depth,
            self.config.max_pages_per_site,
        ))
    }

    /// Crawl a single, already normalized seed
    pub async fn crawl_site(&self, seed: Url) -> Result<SiteReport> {
        let crawler = self.site_crawler(seed, self.services())?;
        Ok(build_report(
            crawler.run().await,
            self.config.fold_socials_into_primary,
        ))
    }

    /// Crawl every valid seed and return one report per distinct seed, in seed order
    pub async fn run(&self, seeds: &[String]) -> Result<Vec<SiteReport>> {
        let seeds = Self::prepare_seeds(seeds);
        ::log::info!(
            "Crawling {} site(s), {} at a time",
            seeds.len(),
            self.config.max_concurrency.max(1)
        );

        let services = self.services();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let fold = self.config.fold_socials_into_primary;

        let mut handles = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let crawler = self.site_crawler(seed.clone(), services.clone())?;
            let semaphore = semaphore.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                build_report(crawler.run().await, fold)
            });
            handles.push((seed, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (seed, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => ::log::error!("Crawl task for {} failed: {}", seed, e),
            }
        }

        self.shutdown().await;
        Ok(reports)
    }

    /// Flattened records of every site, in seed order
    pub async fn run_records(&self, seeds: &[String]) -> Result<Vec<ContactRecord>> {
        let reports = self.run(seeds).await?;
        Ok(reports.into_iter().flat_map(|r| r.records).collect())
    }

    /// Release the browser session, if one was opened
    pub async fn shutdown(&self) {
        if let Some(renderer) = &self.renderer {
            renderer.shutdown().await;
        }
    }
}

fn build_report(crawl: SiteCrawl, fold_socials_into_primary: bool) -> SiteReport {
    let mut aggregator =
        Aggregator::new(crawl.seed.clone()).fold_socials_into_primary(fold_socials_into_primary);
    for page in &crawl.pages {
        aggregator.fold(page);
    }
    let records = aggregator.build(Utc::now());
    ::log::info!("Found {} record(s) for {}", records.len(), crawl.seed);

    SiteReport {
        seed: crawl.seed,
        pages_fetched: crawl.fetched.len(),
        urls_visited: crawl.urls_visited,
        cancelled: crawl.cancelled,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::tests::{MockFetcher, MockRenderer};
    use crate::fetch::FetchResponse;

    fn seeds(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn two_sites() -> MockFetcher {
        MockFetcher::new()
            .page(
                "http://a.test/",
                r#"<a href="/contact">Contact</a><p>Call +1 (415) 555-0100</p>"#,
            )
            .page(
                "http://a.test/contact",
                r#"<a href="mailto:hello@a.test">Mail</a><a href="mailto:jobs@a.test">Jobs</a>"#,
            )
            .page(
                "http://b.test/",
                "<p>No contact details here</p><footer>&copy; 2019-2024 B GmbH</footer>",
            )
    }

    #[test]
    fn test_prepare_seeds() {
        let prepared = ContactCrawler::prepare_seeds(&seeds(&[
            "example.com",
            "https://Example.com/",
            "not a url ::",
            "ftp://files.example.org",
            "https://b.test/about/",
        ]));
        let prepared: Vec<&str> = prepared.iter().map(|u| u.as_str()).collect();
        assert_eq!(prepared, vec!["https://example.com/", "https://b.test/about"]);
    }

    #[tokio::test]
    async fn test_run_in_seed_order() {
        let crawler = ContactCrawler::from_parts(CrawlerConfig::default(), Arc::new(two_sites()));
        let reports = crawler
            .run(&seeds(&["http://b.test", "http://a.test", "b.test"]))
            .await
            .unwrap();

        // "b.test" normalizes to https and is a distinct seed
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].seed.as_str(), "http://b.test/");
        assert!(reports[0].records.is_empty());
        assert_eq!(reports[0].pages_fetched, 1);

        let a = &reports[1];
        assert_eq!(a.pages_fetched, 2);
        assert_eq!(a.records.len(), 2);
        assert_eq!(a.records[0].email.as_deref(), Some("hello@a.test"));
        assert_eq!(a.records[0].phone.as_deref(), Some("+14155550100"));
        assert_eq!(a.records[0].source_page, "/contact");
        assert_eq!(a.records[1].email.as_deref(), Some("jobs@a.test"));

        assert_eq!(reports[2].pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_run_records_flattens() {
        let config = CrawlerConfig {
            max_concurrency: 1,
            ..CrawlerConfig::default()
        };
        let crawler = ContactCrawler::from_parts(config, Arc::new(two_sites()));
        let records = crawler
            .run_records(&seeds(&["http://a.test", "http://b.test"]))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.site_url == "http://a.test/"));
    }

    #[tokio::test]
    async fn test_cancelled_run_fetches_nothing() {
        let fetcher = Arc::new(two_sites());
        let crawler = ContactCrawler::from_parts(CrawlerConfig::default(), fetcher.clone());
        crawler.cancellation_token().cancel();

        let reports = crawler
            .run(&seeds(&["http://a.test", "http://b.test"]))
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.cancelled && r.records.is_empty()));
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_renderer_used_for_failed_pages() {
        let fetcher = MockFetcher::new().response(
            "http://spa.test/",
            Ok(FetchResponse::html(403, "blocked")),
        );
        let renderer = Arc::new(MockRenderer::new().page(
            "http://spa.test/",
            r#"<p>Write to team [at] spa [dot] test</p>"#,
        ));
        let crawler = ContactCrawler::from_parts(CrawlerConfig::default(), Arc::new(fetcher))
            .with_renderer(renderer.clone());

        let report = crawler
            .crawl_site(Url::parse("http://spa.test/").unwrap())
            .await
            .unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].email.as_deref(), Some("team@spa.test"));
        assert_eq!(renderer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unfolded_socials() {
        let fetcher = MockFetcher::new().page(
            "http://c.test/",
            r#"<a href="mailto:hi@c.test">Mail</a><a href="https://github.com/ctest">GitHub</a>"#,
        );
        let config = CrawlerConfig {
            fold_socials_into_primary: false,
            ..CrawlerConfig::default()
        };
        let crawler = ContactCrawler::from_parts(config, Arc::new(fetcher));
        let records = crawler.run_records(&seeds(&["http://c.test"])).await.unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].social_links.is_empty());
        assert_eq!(records[1].platform.as_deref(), Some("github"));
    }

    #[tokio::test]
    async fn test_bad_filter_pattern_is_error() {
        let config = CrawlerConfig {
            exclude_patterns: vec!["(unclosed".to_string()],
            ..CrawlerConfig::default()
        };
        let crawler = ContactCrawler::from_parts(config, Arc::new(MockFetcher::new()));
        let err = crawler.run(&seeds(&["http://a.test"])).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }
}
