use crate::normalize;
use crate::parsers::ParsedPage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Twitter,
    Facebook,
    Instagram,
    YouTube,
    TikTok,
    GitHub,
    GitLab,
    Behance,
    Dribbble,
}

/// Platform → profile domains. A host matches when it equals a domain or is a subdomain of it.
const PLATFORM_DOMAINS: &[(Platform, &[&str])] = &[
    (Platform::LinkedIn, &["linkedin.com"]),
    (Platform::Twitter, &["twitter.com", "x.com"]),
    (Platform::Facebook, &["facebook.com"]),
    (Platform::Instagram, &["instagram.com"]),
    (Platform::YouTube, &["youtube.com", "youtu.be"]),
    (Platform::TikTok, &["tiktok.com"]),
    (Platform::GitHub, &["github.com"]),
    (Platform::GitLab, &["gitlab.com"]),
    (Platform::Behance, &["behance.net"]),
    (Platform::Dribbble, &["dribbble.com"]),
];

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::TikTok => "tiktok",
            Platform::GitHub => "github",
            Platform::GitLab => "gitlab",
            Platform::Behance => "behance",
            Platform::Dribbble => "dribbble",
        }
    }

    /// Classify a URL by its host
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        PLATFORM_DOMAINS
            .iter()
            .find(|(_, domains)| {
                domains
                    .iter()
                    .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
            })
            .map(|(platform, _)| *platform)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: Platform,
    pub url: String,
}

/// Finds profile links to known social platforms among a page's anchors
pub struct SocialExtractor {
    share_regex: Regex,
}

impl Default for SocialExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SocialExtractor {
    pub fn new() -> Self {
        Self {
            share_regex: Regex::new(r"(?i)share|intent|tweet|sharer\.php").unwrap(),
        }
    }

    /// Distinct profile links in document order
    pub fn extract(&self, page: &ParsedPage, page_url: &Url) -> Vec<SocialLink> {
        let mut links: Vec<SocialLink> = Vec::new();

        for anchor in &page.anchors {
            if anchor.href.is_empty() || anchor.href.starts_with('#') {
                continue;
            }
            let Some(url) = normalize::normalize(&anchor.href, Some(page_url)) else {
                continue;
            };
            let Some(platform) = Platform::from_url(&url) else {
                continue;
            };
            if self.share_regex.is_match(url.as_str()) {
                ::log::trace!("Skipping share link {}", url);
                continue;
            }

            let url = url.to_string();
            if !links.iter().any(|l| l.url == url) {
                links.push(SocialLink { platform, url });
            }
        }

        ::log::debug!("Found {} social profile links on {}", links.len(), page_url);
        links
    }
}
