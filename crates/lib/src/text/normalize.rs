//! HTML normalizer: applies a fixed, ordered rule list while flattening the parsed tree,
//! then trims each line and drops the empty ones.

use scraper::{ElementRef, Html, Node};

/// What happens to an element matched by a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove the element and everything under it.
    Drop,
    /// Replace the element with a newline.
    LineBreak,
    /// Keep the element's text and emit a newline after it.
    TrailingNewline,
}

/// Structural transform keyed by tag name and optional class.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub action: Action,
}

impl Rule {
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        let value = el.value();
        if !value.name().eq_ignore_ascii_case(self.tag) {
            return false;
        }
        match self.class {
            Some(class) => value.classes().any(|c| c == class),
            None => true,
        }
    }
}

/// Evaluated in order for every element; the first match wins. Unmatched elements keep their text.
pub const RULES: &[Rule] = &[
    // Audio player markup has no text worth reading.
    Rule { tag: "div", class: Some("audio"), action: Action::Drop },
    Rule { tag: "dl", class: Some("footnote"), action: Action::Drop },
    Rule { tag: "script", class: None, action: Action::Drop },
    Rule { tag: "style", class: None, action: Action::Drop },
    Rule { tag: "br", class: None, action: Action::LineBreak },
    Rule { tag: "p", class: None, action: Action::TrailingNewline },
];

/// Convert card HTML into trimmed, non-empty lines joined by `\n`.
/// Empty input gives empty output; plain text passes through unchanged.
/// Entities are decoded, so escaped markup such as `&lt;b&gt;` comes out as a literal `<b>`
/// and a second pass would parse it as a tag. Repeat passes are only stable on text without `<`.
pub fn normalize(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    flatten(fragment.root_element(), &mut text);

    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn flatten(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match RULES.iter().find(|r| r.matches(&child_el)).map(|r| r.action) {
                    Some(Action::Drop) => {}
                    Some(Action::LineBreak) => out.push('\n'),
                    Some(Action::TrailingNewline) => {
                        flatten(child_el, out);
                        out.push('\n');
                    }
                    None => flatten(child_el, out),
                }
            }
            _ => {}
        }
    }
}
