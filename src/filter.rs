use crate::normalize;
use regex::Regex;
use url::Url;

/// Asset extensions that never hold contact details
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    r"(?i)\.(jpg|jpeg|png|gif|webp|svg|ico|css|js|woff|woff2|ttf|eot|pdf|zip|gz|mp3|mp4|avi|mov)$",
];

/// Decides which discovered links stay in a site's crawl scope.
///
/// A link is in scope when its host equals the seed host and no exclude
/// pattern matches its path. Include patterns, when given, must also match.
#[derive(Debug)]
pub struct UrlFilter {
    domain: String,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a filter scoped to the seed's host
    pub fn new(
        seed: &Url,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, regex::Error> {
        let mut include_regexes = Vec::with_capacity(include_patterns.len());
        for pattern in include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            domain: seed.host_str().unwrap_or_default().to_ascii_lowercase(),
            include_regexes,
            exclude_regexes,
        })
    }

    /// Domain-only filter with no pattern rules
    pub fn for_domain(seed: &Url) -> Self {
        Self {
            domain: seed.host_str().unwrap_or_default().to_ascii_lowercase(),
            include_regexes: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !normalize::is_valid(url) || !self.is_in_domain_scope(url) {
            return false;
        }

        // Exclusions take precedence
        let path = url.path();
        if self.exclude_regexes.iter().any(|r| r.is_match(path)) {
            return false;
        }

        if !self.include_regexes.is_empty() {
            let url_str = url.as_str();
            return self.include_regexes.iter().any(|r| r.is_match(url_str));
        }

        true
    }

    fn is_in_domain_scope(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.domain))
    }
}
