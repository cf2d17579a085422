pub mod email;
pub mod phone;
pub mod social;

pub use email::EmailExtractor;
pub use phone::PhoneExtractor;
pub use social::{Platform, SocialExtractor, SocialLink};

use crate::parsers::ParsedPage;
use std::collections::BTreeMap;
use url::Url;

/// Findings from one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    pub page_url: Url,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub social_links: Vec<SocialLink>,
    pub candidate_links: Vec<Url>,
}

impl PageExtraction {
    pub fn new(page_url: Url) -> Self {
        Self {
            page_url,
            emails: Vec::new(),
            phones: Vec::new(),
            social_links: Vec::new(),
            candidate_links: Vec::new(),
        }
    }

    pub fn has_contacts(&self) -> bool {
        !(self.emails.is_empty() && self.phones.is_empty() && self.social_links.is_empty())
    }

    /// Social profile URLs grouped by platform
    pub fn social_by_platform(&self) -> BTreeMap<Platform, Vec<&str>> {
        let mut grouped: BTreeMap<Platform, Vec<&str>> = BTreeMap::new();
        for link in &self.social_links {
            grouped.entry(link.platform).or_default().push(&link.url);
        }
        grouped
    }
}

/// Runs the email, phone and social detectors over a parsed page
#[derive(Default)]
pub struct ContactExtractor {
    emails: EmailExtractor,
    phones: PhoneExtractor,
    social: SocialExtractor,
}

impl ContactExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phone candidates must be valid for one of `regions`; an empty list keeps
    /// every candidate that passes the digit-count filter
    pub fn with_phone_regions<S: AsRef<str>>(regions: &[S]) -> Self {
        Self {
            phones: PhoneExtractor::with_regions(regions),
            ..Self::default()
        }
    }

    /// Contact findings for a page. Candidate links are left empty.
    pub fn extract(&self, page: &ParsedPage, page_url: &Url) -> PageExtraction {
        let extraction = PageExtraction {
            page_url: page_url.clone(),
            emails: self.emails.extract(page),
            phones: self.phones.extract(page),
            social_links: self.social.extract(page, page_url),
            candidate_links: Vec::new(),
        };

        ::log::debug!(
            "Extracted from {}: emails={} phones={} socials={}",
            page_url,
            extraction.emails.len(),
            extraction.phones.len(),
            extraction.social_links.len()
        );
        for (platform, urls) in extraction.social_by_platform() {
            ::log::trace!("{} {:?} profile(s) on {}: {:?}", urls.len(), platform, page_url, urls);
        }
        extraction
    }
}
