//! Allowlist sanitiser for job ad descriptions
//!
//! The description is parsed into a DOM and re-emitted from scratch: only the
//! formatting tags below survive, no attribute survives except a checked
//! `href` on links, and all text is re-encoded. Nothing from the input is
//! copied through as raw markup.

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{node::Node, ElementRef, Html};

const ALLOWED_TAGS: [&str; 29] = [
    "a", "b", "blockquote", "br", "code", "div", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "li", "ol", "p", "pre", "s", "span", "strong", "sub", "sup", "table", "tbody", "td",
    "tr", "ul",
];

const VOID_TAGS: [&str; 2] = ["br", "hr"];

/// Removed together with everything inside them.
const DROPPED_TAGS: [&str; 13] = [
    "script", "style", "iframe", "object", "embed", "template", "noscript", "svg", "math",
    "textarea", "select", "title", "frameset",
];

const LINK_SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];

/// Keep formatting markup from upstream rich text and drop everything active.
///
/// Unknown tags are unwrapped (their text stays), dropped tags disappear with
/// their content, and links keep only http(s) or mailto targets.
pub fn sanitize_rich_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_children(fragment.root_element(), &mut out);
    out.trim().to_string()
}

fn write_children(parent: ElementRef<'_>, out: &mut String) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                out.push_str(&encode_text(text));
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(element, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if DROPPED_TAGS.contains(&name) {
        return;
    }
    if !ALLOWED_TAGS.contains(&name) {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);
    if name == "a" {
        if let Some(href) = element.value().attr("href").and_then(safe_href) {
            out.push_str(&format!(
                " href=\"{}\" rel=\"noopener noreferrer\"",
                encode_double_quoted_attribute(href)
            ));
        }
    }
    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }
    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// The parser has already decoded entities, so `jav&#x09;ascript:` arrives
/// here with a literal tab and fails the scheme check.
fn safe_href(href: &str) -> Option<&str> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    LINK_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
        .then_some(href)
}
