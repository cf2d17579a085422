use crate::error::{Error, Result};
use crate::fetch::FetchOptions;
use crate::filter::DEFAULT_EXCLUDE_PATTERNS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `webdriver_url`
pub const WEBDRIVER_URL_ENV: &str = "WEBDRIVER_URL";

/// Settings for a crawl run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Deepest link level followed from the seed (seed is depth 0)
    #[serde(alias = "maxDepth")]
    pub max_depth: usize,

    /// Maximum pages fetched per site
    #[serde(alias = "maxPagesPerSite")]
    pub max_pages_per_site: usize,

    /// HTTP request timeout in seconds
    #[serde(alias = "timeout", alias = "requestTimeout")]
    pub request_timeout: u64,

    /// Renderer navigation timeout in seconds
    #[serde(alias = "dynamic_render_timeout", alias = "renderTimeout")]
    pub render_timeout: u64,

    #[serde(alias = "userAgent")]
    pub user_agent: String,

    /// Retry failed pages in a headless browser
    #[serde(alias = "use_dynamic_crawler", alias = "useDynamicFallback")]
    pub use_dynamic_fallback: bool,

    /// Content-type substrings accepted from HTTP responses
    #[serde(alias = "allowedContentTypes")]
    pub allowed_content_types: Vec<String>,

    /// Proxy URL for every HTTP request
    pub proxy: Option<String>,

    /// Regions phone numbers are validated against, tried in order; empty disables validation
    #[serde(alias = "regionsForPhones")]
    pub regions_for_phones: Vec<String>,

    /// Number of sites crawled at the same time
    #[serde(alias = "concurrent_requests", alias = "maxConcurrency")]
    pub max_concurrency: usize,

    /// URL for the WebDriver instance
    #[serde(alias = "webdriverUrl")]
    pub webdriver_url: String,

    /// Cap on links followed from one page, keeping the best-scored ones
    #[serde(alias = "maxLinksPerPage")]
    pub max_links_per_page: Option<usize>,

    /// Regex patterns for URLs to include
    #[serde(alias = "includePatterns")]
    pub include_patterns: Vec<String>,

    /// Regex patterns (matched against the path) for URLs to exclude
    #[serde(alias = "excludePatterns")]
    pub exclude_patterns: Vec<String>,

    /// Put every social link on the primary record
    #[serde(alias = "foldSocialsIntoPrimary")]
    pub fold_socials_into_primary: bool,

    /// Total run time in seconds before remaining crawls stop
    #[serde(alias = "runTimeout")]
    pub run_timeout: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages_per_site: 15,
            request_timeout: default_timeout_secs(),
            render_timeout: default_timeout_secs(),
            user_agent: default_user_agent(),
            use_dynamic_fallback: false,
            allowed_content_types: vec!["text/html".to_string()],
            proxy: None,
            regions_for_phones: ["DE", "AT", "CH", "SE", "NO", "DK", "FI", "IS"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
            max_concurrency: 4,
            webdriver_url: default_webdriver_url(),
            max_links_per_page: None,
            include_patterns: Vec::new(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            fold_socials_into_primary: true,
            run_timeout: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("contact-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl CrawlerConfig {
    /// Load configuration from a file.
    ///
    /// A missing file falls back to the defaults with a warning. A file that
    /// cannot be read or parsed is an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ::log::warn!(
                    "Config file {} not found, using default configuration",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let config: Self = serde_json::from_str(&contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        ::log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                ::log::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Override the WebDriver URL with an environment variable if provided
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var(WEBDRIVER_URL_ENV) {
            self.apply_webdriver_override(&webdriver_url);
        }
    }

    fn apply_webdriver_override(&mut self, webdriver_url: &str) {
        if !webdriver_url.is_empty() {
            self.webdriver_url = webdriver_url.to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout.map(Duration::from_secs)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: self.request_timeout(),
            render_timeout: self.render_timeout(),
            user_agent: self.user_agent.clone(),
            allowed_content_types: self.allowed_content_types.clone(),
        }
    }
}
