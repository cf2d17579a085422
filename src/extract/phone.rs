use crate::parsers::ParsedPage;
use phonenumber::{country, Mode};
use regex::Regex;

pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 18;

/// Phone detector for visible text and `tel:` links.
///
/// With no regions every candidate that survives the digit-count filter is
/// kept. With regions a candidate must also be a valid number for one of
/// them, and is reported in E.164 form.
pub struct PhoneExtractor {
    phone_regex: Regex,
    date_regex: Regex,
    regions: Vec<country::Id>,
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneExtractor {
    pub fn new() -> Self {
        Self {
            // country code, then either a "(0)" trunk or an opening paren, then 7-15 grouped digits
            // separators never include line breaks, which split block elements
            phone_regex: Regex::new(
                r"(?:(?:\+|00)\d{1,3}[ \t\-./]?)?(?:\(0\)[ \t]*|\()?(?:\d[ \t\-./()]{0,2}){6,14}\d",
            )
            .unwrap(),
            // year ranges and numeric dates such as 2019-2024, 2024-01-15, 15.01.2024
            date_regex: Regex::new(
                r"^(?:(?:19|20)\d{2}[ \-./]*(?:(?:19|20)\d{2}|\d{1,2}[\-./]\d{1,2})|\d{1,2}[\-./]\d{1,2}[\-./](?:19|20)\d{2})$",
            )
            .unwrap(),
            regions: Vec::new(),
        }
    }

    /// Validates candidates against the given ISO 3166 region codes, tried in order.
    /// Unknown codes are skipped with a warning.
    pub fn with_regions<S: AsRef<str>>(regions: &[S]) -> Self {
        let regions = regions
            .iter()
            .filter_map(|code| {
                let code = code.as_ref().trim().to_ascii_uppercase();
                match code.parse::<country::Id>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        ::log::warn!("Ignoring unknown phone region {:?}", code);
                        None
                    }
                }
            })
            .collect();

        Self {
            regions,
            ..Self::new()
        }
    }

    /// All distinct normalized phone numbers on the page in discovery order
    pub fn extract(&self, page: &ParsedPage) -> Vec<String> {
        let mut phones: Vec<String> = Vec::new();
        let mut push = |candidate: &str| {
            if let Some(phone) = self.accept(candidate) {
                if !phones.contains(&phone) {
                    phones.push(phone);
                }
            }
        };

        for anchor in &page.anchors {
            if let Some(target) = strip_tel(&anchor.href) {
                push(target);
            }
        }

        for m in self.phone_regex.find_iter(&page.text) {
            push(m.as_str());
        }

        phones
    }

    fn accept(&self, candidate: &str) -> Option<String> {
        if self.date_regex.is_match(candidate.trim()) {
            ::log::trace!("Discarding date-like phone candidate {:?}", candidate);
            return None;
        }
        let normalized = normalize_phone(candidate)?;
        if self.regions.is_empty() {
            return Some(normalized);
        }
        self.validate(&normalized)
    }

    /// E.164 form for the first region under which the number is valid
    fn validate(&self, normalized: &str) -> Option<String> {
        let valid = self.regions.iter().find_map(|region| {
            let number = phonenumber::parse(Some(*region), normalized).ok()?;
            phonenumber::is_valid(&number).then(|| number.format().mode(Mode::E164).to_string())
        });
        if valid.is_none() {
            ::log::trace!("Discarding phone candidate {:?}, not valid in any region", normalized);
        }
        valid
    }
}

/// Normalizes a phone candidate.
///
/// A leading `+` is kept and a leading `00` becomes `+`. A `(0)` trunk marker
/// is dropped and every other non-digit is stripped. Returns `None` when the
/// result has fewer than 7 or more than 18 digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim().replace("(0)", "");
    let trimmed = trimmed.trim();

    let (international, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix("00") {
        (true, rest)
    } else {
        (false, trimmed)
    };

    let digits = rest.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        ::log::trace!("Discarding phone candidate {:?} with {} digits", raw, digits.len());
        return None;
    }

    Some(if international {
        format!("+{}", digits)
    } else {
        digits
    })
}

fn strip_tel(href: &str) -> Option<&str> {
    let prefix = href.get(..4)?;
    prefix.eq_ignore_ascii_case("tel:").then(|| &href[4..])
}
