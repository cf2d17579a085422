use crate::error::{Error, Result};
use crate::parsers::ParsedPage;
use regex::Regex;

/// Finds email addresses in `mailto:` targets, visible text, ld+json blocks and
/// Cloudflare payloads
pub struct EmailExtractor {
    email_regex: Regex,
    valid_regex: Regex,
    deobfuscation: Vec<(Regex, &'static str)>,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailExtractor {
    pub fn new() -> Self {
        let rule = |pattern: &str, replacement| (Regex::new(pattern).unwrap(), replacement);
        Self {
            email_regex: Regex::new(
                r"[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*\.[a-zA-Z]{2,63}",
            )
            .unwrap(),
            valid_regex: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap(),
            // Bracketed forms run before the bare " at " form
            deobfuscation: vec![
                rule(r"(?i)\s*\[\s*at\s*\]\s*", "@"),
                rule(r"(?i)\s*\(\s*at\s*\)\s*", "@"),
                rule(r"(?i)\s+at\s+", "@"),
                rule(r"(?i)\s*\[\s*dot\s*\]\s*", "."),
                rule(r"(?i)\s*\(\s*dot\s*\)\s*", "."),
                rule(r"(?i)\s+dot\s+", "."),
            ],
        }
    }

    /// All distinct, valid emails on the page in discovery order
    pub fn extract(&self, page: &ParsedPage) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();
        let mut push = |candidate: &str| {
            if let Some(email) = self.clean(candidate) {
                if !emails.contains(&email) {
                    emails.push(email);
                }
            }
        };

        for anchor in &page.anchors {
            if let Some(target) = strip_mailto(&anchor.href) {
                push(target);
            }
        }

        let text = self.deobfuscate(&page.text);
        for m in self.email_regex.find_iter(&text) {
            push(m.as_str());
        }

        // structured data is machine-written, so it is scanned without deobfuscation
        for body in &page.json_ld {
            for m in self.email_regex.find_iter(body) {
                push(m.as_str());
            }
        }

        for encoded in &page.cf_emails {
            match decode_cfemail(encoded) {
                Ok(decoded) => push(&decoded),
                Err(e) => ::log::debug!("{}", e),
            }
        }

        emails
    }

    /// Rewrites "x [at] y [dot] z" style text into plain email form
    pub fn deobfuscate(&self, text: &str) -> String {
        self.deobfuscation
            .iter()
            .fold(text.to_string(), |acc, (regex, replacement)| {
                regex.replace_all(&acc, *replacement).into_owned()
            })
    }

    /// Normalizes a raw candidate and returns it only if it looks like an email
    pub fn clean(&self, raw: &str) -> Option<String> {
        let email = normalize_email(raw);
        self.valid_regex.is_match(&email).then_some(email)
    }
}

/// Lower-cases and strips `mailto:`, query strings and trailing punctuation
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = strip_mailto(trimmed).unwrap_or(trimmed);
    let without_query = without_scheme
        .split('?')
        .next()
        .unwrap_or_default();
    without_query
        .trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .to_lowercase()
}

fn strip_mailto(href: &str) -> Option<&str> {
    let prefix = href.get(..7)?;
    prefix
        .eq_ignore_ascii_case("mailto:")
        .then(|| &href[7..])
}

/// Decodes a Cloudflare `data-cfemail` payload.
///
/// The first byte is the XOR key for every following byte. Odd lengths,
/// non-hex digits and non-UTF-8 output are reported as extraction noise.
pub fn decode_cfemail(encoded: &str) -> Result<String> {
    let noise = |reason: &str| Error::ExtractionNoise(format!("data-cfemail {:?}: {}", encoded, reason));

    if encoded.len() < 2 || encoded.len() % 2 != 0 || !encoded.is_ascii() {
        return Err(noise("payload length must be an even number of hex digits"));
    }

    let bytes = (0..encoded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&encoded[i..i + 2], 16))
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| noise("not hex"))?;

    let key = bytes[0];
    let decoded = bytes[1..].iter().map(|b| b ^ key).collect::<Vec<u8>>();
    String::from_utf8(decoded).map_err(|_| noise("decoded bytes are not UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html;

    fn extract(html_src: &str) -> Vec<String> {
        EmailExtractor::new().extract(&html::parse(html_src))
    }

    #[test]
    fn test_mailto_targets() {
        let emails = extract(
            r#"<a href="mailto:Sales@Example.com?subject=Hi">Write</a>
               <a href="MAILTO:support@example.com">Support</a>
               <a href="mailto:">Empty</a>"#,
        );
        assert_eq!(emails, vec!["sales@example.com", "support@example.com"]);
    }

    #[test]
    fn test_case_and_whitespace_dedup() {
        let emails = extract("<p>Info@Example.com</p><p>info@example.com </p>");
        assert_eq!(emails, vec!["info@example.com"]);
    }

    #[test]
    fn test_trailing_punctuation() {
        let emails = extract("<p>Reach us at: hello@example.org.</p>");
        assert_eq!(emails, vec!["hello@example.org"]);
    }

    #[test]
    fn test_deobfuscation() {
        let extractor = EmailExtractor::new();
        assert_eq!(
            extractor.deobfuscate("info [at] example [dot] com"),
            "info@example.com"
        );
        assert_eq!(
            extractor.deobfuscate("jobs(AT)example(Dot)co(dot)uk"),
            "jobs@example.co.uk"
        );
        assert_eq!(extractor.deobfuscate("anna at acme dot io"), "anna@acme.io");

        let emails = extract("<p>Mail: press [at] example [dot] org</p>");
        assert_eq!(emails, vec!["press@example.org"]);
    }

    #[test]
    fn test_json_ld_emails() {
        let emails = extract(
            r#"<head><script type="application/ld+json">
                {"@type": "Organization", "email": "mailto:Office@Acme.de",
                 "contactPoint": {"email": "sales@acme.de"}}
            </script><script>var hidden = "tracker@ads.example";</script></head>
            <body><p>hello@acme.de</p></body>"#,
        );
        assert_eq!(emails, vec!["hello@acme.de", "office@acme.de", "sales@acme.de"]);
    }

    #[test]
    fn test_cloudflare_decode_vector() {
        // key 0x1e, 'i' ^ 0x1e == 0x77
        assert_eq!(decode_cfemail("1e77").unwrap(), "i");
        assert_eq!(
            decode_cfemail("422b2c242d02273a232f322e276c36273136").unwrap(),
            "info@example.test"
        );
    }

    #[test]
    fn test_cloudflare_decode_failures() {
        assert!(matches!(decode_cfemail("1"), Err(Error::ExtractionNoise(_))));
        assert!(matches!(decode_cfemail("1e7"), Err(Error::ExtractionNoise(_))));
        assert!(matches!(decode_cfemail("zz77"), Err(Error::ExtractionNoise(_))));
        // a lone 0xff byte is not UTF-8
        assert!(decode_cfemail("00ff").is_err());
    }

    #[test]
    fn test_cloudflare_on_page() {
        let emails = extract(
            r#"<a data-cfemail="422b2c242d02273a232f322e276c36273136">[email protected]</a>
               <span data-cfemail="nothex"></span>"#,
        );
        assert_eq!(emails, vec!["info@example.test"]);
    }

    #[test]
    fn test_invalid_candidates_rejected() {
        let extractor = EmailExtractor::new();
        assert!(extractor.clean("not-an-email").is_none());
        assert!(extractor.clean("a@b").is_none());
        assert!(extractor.clean("mailto:").is_none());
        assert_eq!(extractor.clean(" mailto:A@B.io; ").as_deref(), Some("a@b.io"));
    }

    #[test]
    fn test_deterministic() {
        let src = r#"<p>b@example.com a@example.com</p><a href="mailto:c@example.com">c</a>"#;
        assert_eq!(extract(src), extract(src));
        assert_eq!(extract(src), vec!["c@example.com", "b@example.com", "a@example.com"]);
    }
}
