use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://").unwrap());

/// Prepends `https://` when the string carries no `scheme://` prefix
pub fn ensure_scheme(url: &str) -> String {
    if SCHEME_PREFIX.is_match(url) {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Canonicalizes a URL.
///
/// Relative references are resolved against `base` when one is given. Without a
/// base, a missing scheme defaults to `https`. Protocol-relative references
/// (`//host/path`) always become `https`. The host is lower-cased, the fragment
/// is dropped and trailing slashes are removed from any path other than `/`.
///
/// Returns `None` for anything that does not parse or is not an http(s) URL
/// with a host.
pub fn normalize(raw: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if let Some(rest) = trimmed.strip_prefix("//") {
        Url::parse(&format!("https://{}", rest))
    } else if let Some(base) = base {
        base.join(trimmed)
    } else {
        Url::parse(&ensure_scheme(trimmed))
    };

    let mut url = match parsed {
        Ok(url) => url,
        Err(e) => {
            ::log::debug!("Rejecting malformed URL {:?}: {}", raw, e);
            return None;
        }
    };

    if !is_valid(&url) {
        ::log::debug!("Rejecting non-http URL: {}", url);
        return None;
    }

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let stripped = path.trim_end_matches('/');
        let stripped = if stripped.is_empty() { "/" } else { stripped }.to_string();
        url.set_path(&stripped);
    }

    Some(url)
}

/// Normalizes a seed, reporting why it was rejected
pub fn normalize_seed(raw: &str) -> Result<Url> {
    normalize(raw, None)
        .ok_or_else(|| Error::invalid_input(raw, "not an http(s) URL with a host"))
}

/// True iff the scheme is http or https and the host is non-empty
pub fn is_valid(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}

/// True iff both URLs have the same host, compared case-insensitively
pub fn same_domain(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Path plus query of a URL, e.g. `/contact?lang=en`
pub fn page_path(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}
