use crate::frontier::PRIORITY_KEYWORDS;
use crate::normalize;
use crate::parsers::ParsedPage;
use std::collections::HashSet;
use url::Url;

/// Hrefs that never lead to another page
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Turns a page's anchors into absolute candidate URLs.
///
/// With `max_links` set, pages with more candidates than the cap keep only the
/// best-scored ones: one point per contact keyword found in the path plus the
/// anchor text, ties broken by URL.
#[derive(Debug, Clone, Default)]
pub struct LinkExtractor {
    max_links: Option<usize>,
}

impl LinkExtractor {
    pub fn new(max_links: Option<usize>) -> Self {
        Self { max_links }
    }

    /// Distinct absolute candidates in document order, or in score order when truncated
    pub fn extract(&self, page: &ParsedPage, base: &Url) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut candidates: Vec<(Url, usize)> = Vec::new();

        for anchor in &page.anchors {
            let href = anchor.href.as_str();
            if href.is_empty() || href.starts_with('#') || has_skipped_scheme(href) {
                continue;
            }
            let Some(url) = normalize::normalize(href, Some(base)) else {
                continue;
            };
            if !seen.insert(url.as_str().to_string()) {
                continue;
            }
            let score = score(&url, &anchor.text);
            candidates.push((url, score));
        }

        ::log::debug!("Found {} candidate links on {}", candidates.len(), base);

        match self.max_links {
            Some(cap) if candidates.len() > cap => {
                candidates.sort_by(|(a_url, a_score), (b_url, b_score)| {
                    b_score
                        .cmp(a_score)
                        .then_with(|| a_url.as_str().cmp(b_url.as_str()))
                });
                candidates.truncate(cap);
                ::log::debug!("Truncated candidate links on {} to {}", base, cap);
            }
            _ => {}
        }

        candidates.into_iter().map(|(url, _)| url).collect()
    }
}

fn has_skipped_scheme(href: &str) -> bool {
    SKIPPED_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Number of contact keywords present in the path and anchor text
pub fn score(url: &Url, anchor_text: &str) -> usize {
    let haystack = format!("{} {}", url.path(), anchor_text).to_lowercase();
    PRIORITY_KEYWORDS
        .iter()
        .filter(|k| haystack.contains(*k))
        .count()
}
