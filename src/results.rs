use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Platform label for a record whose social links span several platforms
pub const MULTIPLE_PLATFORMS: &str = "multiple";

/// One exported contact row for a crawled site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    /// Normalized seed URL of the site
    #[serde(rename = "url")]
    pub site_url: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub social_links: Vec<String>,
    pub platform: Option<String>,
    /// Path (and query) of the page the first value was found on
    pub source_page: String,
    /// ISO-8601 UTC, second precision
    pub timestamp: String,
}

impl ContactRecord {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.social_links.is_empty()
    }
}

/// Outcome of crawling one seed
#[derive(Debug, Clone)]
pub struct SiteReport {
    pub seed: Url,
    pub pages_fetched: usize,
    pub urls_visited: usize,
    /// Stopped by cancellation or the run deadline rather than by its bounds
    pub cancelled: bool,
    pub records: Vec<ContactRecord>,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
