//! Boilerplate stripping and whitespace normalization.

use scraper::{Html, Node};

/// Elements whose subtrees carry no analyzable content.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "template", "iframe",
];

/// Default character budget for normalized page text.
pub const DEFAULT_TEXT_BUDGET: usize = 5000;

/// Reduce raw markup to whitespace-collapsed visible text, truncated to
/// `limit` characters on a char boundary.
///
/// The parser is error-tolerant, so malformed markup degrades to whatever
/// text is recoverable instead of failing. Pure function of its inputs.
///
/// ```
/// use gapscan_web::normalize::clean_text;
///
/// let html = "<html><head><style>p{}</style></head>\
///             <body><nav>menu</nav><p>hello   world</p></body></html>";
/// assert_eq!(clean_text(html, 100), "hello world");
/// ```
pub fn clean_text(html: &str, limit: usize) -> String {
    let doc = Html::parse_document(html);

    let mut raw = String::with_capacity(html.len() / 4);
    collect_visible(*doc.root_element(), &mut raw);

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(collapsed, limit)
}

fn collect_visible(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => {
                let text: &str = &t.text;
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if NON_CONTENT_TAGS.contains(&el.name()) => {}
            Node::Element(_) => collect_visible(child, out),
            _ => {}
        }
    }
}

fn truncate_chars(mut s: String, limit: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(limit) {
        s.truncate(idx);
    }
    s
}
