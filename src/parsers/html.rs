use scraper::node::Node;
use scraper::{Html, Selector};

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of visible text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "li", "main",
    "nav", "ol", "option", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

/// An `<a href>` with its collapsed anchor text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Everything the extractors need from one HTML document.
///
/// Built once per fetched page so that `scraper::Html`, which is not `Send`,
/// never lives across an await point.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Visible text, one line per block element, runs of spaces collapsed
    pub text: String,
    /// Anchors in document order
    pub anchors: Vec<Anchor>,
    /// Raw values of every `data-cfemail` attribute
    pub cf_emails: Vec<String>,
    /// Bodies of `<script type="application/ld+json">` blocks
    pub json_ld: Vec<String>,
}

/// Parses HTML content into text, anchors and Cloudflare payloads
pub fn parse(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let link_selector = Selector::parse("a[href]").unwrap();
    let anchors = doc
        .select(&link_selector)
        .filter_map(|e| {
            e.value().attr("href").map(|href| Anchor {
                href: href.trim().to_string(),
                text: collapse_whitespace(&e.text().collect::<Vec<_>>().join(" ")),
            })
        })
        .collect::<Vec<_>>();

    let cf_selector = Selector::parse("[data-cfemail]").unwrap();
    let cf_emails = doc
        .select(&cf_selector)
        .filter_map(|e| e.value().attr("data-cfemail"))
        .map(|s| s.trim().to_string())
        .collect::<Vec<_>>();

    let json_ld_selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    let json_ld = doc
        .select(&json_ld_selector)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>();

    ::log::debug!(
        "HTML parser found {} anchors, {} data-cfemail values and {} ld+json blocks",
        anchors.len(),
        cf_emails.len(),
        json_ld.len()
    );

    ParsedPage {
        text: visible_text(&doc),
        anchors,
        cf_emails,
        json_ld,
    }
}

/// Text of every node outside script/style-like elements.
///
/// Text under different block elements lands on different lines so that
/// neighbouring cells or paragraphs never run together.
fn visible_text(doc: &Html) -> String {
    let mut raw = String::new();
    let mut current_block = None;

    for node in doc.tree.root().descendants() {
        match node.value() {
            Node::Element(e) if e.name() == "br" => raw.push('\n'),
            Node::Text(text) => {
                let mut hidden = false;
                let mut block = None;
                for ancestor in node.ancestors() {
                    if let Node::Element(e) = ancestor.value() {
                        if HIDDEN_ELEMENTS.contains(&e.name()) {
                            hidden = true;
                            break;
                        }
                        if block.is_none() && BLOCK_ELEMENTS.contains(&e.name()) {
                            block = Some(ancestor.id());
                        }
                    }
                }
                if hidden {
                    continue;
                }
                if block != current_block {
                    raw.push('\n');
                    current_block = block;
                }
                raw.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            _ => {}
        }
    }

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
