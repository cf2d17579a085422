use std::collections::{HashSet, VecDeque};
use url::Url;

/// Path keywords that mark a page as likely to hold contact details
pub const PRIORITY_KEYWORDS: &[&str] = &[
    "contact", "kontakt", "about", "impressum", "team", "imprint", "company", "staff", "people",
    "crew",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
}

impl Priority {
    /// High when the lower-cased path contains any priority keyword
    pub fn for_url(url: &Url) -> Self {
        let path = url.path().to_lowercase();
        if PRIORITY_KEYWORDS.iter().any(|k| path.contains(k)) {
            Priority::High
        } else {
            Priority::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: usize,
    pub priority: Priority,
}

/// Immutable per-site crawl bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlBudget {
    pub max_depth: usize,
    pub max_pages: usize,
    /// Host of the seed; every fetched URL must carry it
    pub domain: String,
}

impl CrawlBudget {
    pub fn new(seed: &Url, max_depth: usize, max_pages: usize) -> Self {
        Self {
            max_depth,
            max_pages,
            domain: seed.host_str().unwrap_or_default().to_ascii_lowercase(),
        }
    }
}

/// Two-lane work queue for one site.
///
/// The high lane is drained before the normal lane and each lane is FIFO.
/// URLs are marked visited when they are enqueued, so a URL can enter the
/// frontier at most once.
#[derive(Debug, Default)]
pub struct Frontier {
    high: VecDeque<FrontierEntry>,
    normal: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Frontier holding only the seed at depth 0
    pub fn seeded(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.offer(seed, 0, Priority::Normal);
        frontier
    }

    /// Enqueue a URL unless it was seen before. Returns whether it was queued.
    pub fn offer(&mut self, url: Url, depth: usize, priority: Priority) -> bool {
        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }
        let entry = FrontierEntry {
            url,
            depth,
            priority,
        };
        match priority {
            Priority::High => self.high.push_back(entry),
            Priority::Normal => self.normal.push_back(entry),
        }
        true
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.high.pop_front().or_else(|| self.normal.pop_front())
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.normal.is_empty()
    }

    /// Entries still waiting
    pub fn len(&self) -> usize {
        self.high.len() + self.normal.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_seeded() {
        let mut frontier = Frontier::seeded(url("https://example.com/"));
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.visited_len(), 1);

        let entry = frontier.pop().unwrap();
        assert_eq!(entry.depth, 0);
        assert!(frontier.is_empty());
        // Popping does not forget the URL
        assert_eq!(frontier.visited_len(), 1);
    }

    #[test]
    fn test_high_lane_first() {
        let mut frontier = Frontier::default();
        frontier.offer(url("https://example.com/blog/post"), 1, Priority::Normal);
        frontier.offer(url("https://example.com/news"), 1, Priority::Normal);
        frontier.offer(url("https://example.com/contact"), 1, Priority::High);
        frontier.offer(url("https://example.com/team"), 1, Priority::High);

        let order: Vec<String> = std::iter::from_fn(|| frontier.pop())
            .map(|e| e.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/contact", "/team", "/blog/post", "/news"]);
    }

    #[test]
    fn test_offer_deduplicates() {
        let mut frontier = Frontier::seeded(url("https://example.com/"));
        assert!(frontier.offer(url("https://example.com/about"), 1, Priority::High));
        assert!(!frontier.offer(url("https://example.com/about"), 2, Priority::Normal));
        assert!(!frontier.offer(url("https://example.com/"), 1, Priority::Normal));
        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.visited_len(), 2);
    }

    #[test]
    fn test_priority_keywords() {
        assert_eq!(Priority::for_url(&url("https://a.com/Kontakt")), Priority::High);
        assert_eq!(Priority::for_url(&url("https://a.com/de/impressum")), Priority::High);
        assert_eq!(Priority::for_url(&url("https://a.com/our-crew")), Priority::High);
        assert_eq!(Priority::for_url(&url("https://a.com/blog/post")), Priority::Normal);
        // Only the path counts
        assert_eq!(Priority::for_url(&url("https://contact.a.com/")), Priority::Normal);
    }

    #[test]
    fn test_budget_domain() {
        let budget = CrawlBudget::new(&url("https://Example.com/start"), 2, 15);
        assert_eq!(budget.domain, "example.com");
        assert_eq!(budget.max_pages, 15);
    }
}
