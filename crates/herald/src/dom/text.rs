// ABOUTME: Renders scraper element trees as plain block text with blank lines between paragraphs.
// ABOUTME: Skips non-content elements such as scripts, styles, and embedded media.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use crate::extractors::fields::normalize_whitespace;

/// Elements whose subtree never contributes text.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "button", "select",
    "textarea", "form", "nav", "head",
];

/// Elements that start and end a paragraph of output.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Text of several elements in order, as one paragraph list.
pub fn blocks_text<'a, I>(roots: I) -> String
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    let mut out = Vec::new();
    let mut buf = String::new();
    for root in roots {
        walk(*root, &mut buf, &mut out);
        flush(&mut buf, &mut out);
    }
    out.join("\n\n")
}

fn walk(node: NodeRef<'_, Node>, buf: &mut String, out: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => buf.push_str(text),
        Node::Element(el) => {
            let name = el.name();
            if SKIP_TAGS.contains(&name) {
                return;
            }
            if name == "br" {
                buf.push(' ');
                return;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                flush(buf, out);
            }
            for child in node.children() {
                walk(child, buf, out);
            }
            if block {
                flush(buf, out);
            }
        }
        _ => {}
    }
}

fn flush(buf: &mut String, out: &mut Vec<String>) {
    let text = normalize_whitespace(buf);
    if !text.is_empty() {
        out.push(text);
    }
    buf.clear();
}
