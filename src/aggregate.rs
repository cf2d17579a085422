use crate::extract::{PageExtraction, Platform};
use crate::normalize::page_path;
use crate::results::{ContactRecord, MULTIPLE_PLATFORMS, format_timestamp};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use url::Url;

/// Insertion-ordered map that keeps the first value recorded for each key
#[derive(Debug)]
struct FirstSeen<V> {
    order: Vec<String>,
    values: HashMap<String, V>,
}

impl<V> Default for FirstSeen<V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            values: HashMap::new(),
        }
    }
}

impl<V> FirstSeen<V> {
    fn insert(&mut self, key: &str, value: V) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.order.push(key.to_string());
        self.values.insert(key.to_string(), value);
        true
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v)))
    }

    fn first(&self) -> Option<(&str, &V)> {
        self.iter().next()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Folds a site's page extractions into contact records.
///
/// Pages must be folded in fetch order. The first page a value appears on is
/// its source; later sightings never replace it.
#[derive(Debug)]
pub struct Aggregator {
    site_url: Url,
    fold_socials_into_primary: bool,
    emails: FirstSeen<String>,
    phones: FirstSeen<String>,
    socials: FirstSeen<(Platform, String)>,
}

impl Aggregator {
    pub fn new(site_url: Url) -> Self {
        Self {
            site_url,
            fold_socials_into_primary: true,
            emails: FirstSeen::default(),
            phones: FirstSeen::default(),
            socials: FirstSeen::default(),
        }
    }

    /// With `false`, social links always get one record each instead of joining the primary
    pub fn fold_socials_into_primary(mut self, fold: bool) -> Self {
        self.fold_socials_into_primary = fold;
        self
    }

    pub fn fold(&mut self, page: &PageExtraction) {
        if !page.has_contacts() {
            return;
        }
        let source = page_path(&page.page_url);
        for email in &page.emails {
            self.emails.insert(email, source.clone());
        }
        for phone in &page.phones {
            self.phones.insert(phone, source.clone());
        }
        for link in &page.social_links {
            self.socials.insert(&link.url, (link.platform, source.clone()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.socials.is_empty()
    }

    /// Primary record followed by one record per overflow value
    pub fn build(self, at: DateTime<Utc>) -> Vec<ContactRecord> {
        ::log::debug!(
            "Aggregated for {}: {} emails, {} phones, {} social links",
            self.site_url,
            self.emails.len(),
            self.phones.len(),
            self.socials.len()
        );

        if self.is_empty() {
            return Vec::new();
        }

        let site_url = self.site_url.to_string();
        let timestamp = format_timestamp(at);
        let record = |email: Option<&str>,
                      phone: Option<&str>,
                      social_links: Vec<String>,
                      platform: Option<String>,
                      source_page: &str| ContactRecord {
            site_url: site_url.clone(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            social_links,
            platform,
            source_page: source_page.to_string(),
            timestamp: timestamp.clone(),
        };

        let primary_email = self.emails.first();
        let primary_phone = self.phones.first();

        let (primary_socials, primary_platform) = if self.fold_socials_into_primary {
            let links = self.socials.iter().map(|(url, _)| url.to_string()).collect();
            let platforms = self.socials.iter().map(|(_, (p, _))| *p).collect::<BTreeSet<_>>();
            (links, platform_label(&platforms))
        } else {
            (Vec::new(), None)
        };

        let primary_source = primary_email
            .map(|(_, src)| src.as_str())
            .or(primary_phone.map(|(_, src)| src.as_str()))
            .or(self.socials.first().map(|(_, (_, src))| src.as_str()))
            .unwrap_or("/");

        let mut records = Vec::new();
        let primary = record(
            primary_email.map(|(e, _)| e),
            primary_phone.map(|(p, _)| p),
            primary_socials,
            primary_platform,
            primary_source,
        );
        let primary_has_socials = !primary.social_links.is_empty();
        if !primary.is_empty() {
            records.push(primary);
        }

        for (email, source) in self.emails.iter().skip(1) {
            records.push(record(Some(email), None, Vec::new(), None, source));
        }
        for (phone, source) in self.phones.iter().skip(1) {
            records.push(record(None, Some(phone), Vec::new(), None, source));
        }

        if !primary_has_socials {
            for (link, (platform, source)) in self.socials.iter() {
                records.push(record(
                    None,
                    None,
                    vec![link.to_string()],
                    Some(platform.to_string()),
                    source,
                ));
            }
        }

        records
    }
}

/// The single platform name, `multiple` for several, `None` for none
pub fn platform_label(platforms: &BTreeSet<Platform>) -> Option<String> {
    match platforms.len() {
        0 => None,
        1 => platforms.iter().next().map(|p| p.to_string()),
        _ => Some(MULTIPLE_PLATFORMS.to_string()),
    }
}
