//! Flat event stream over a parsed html page.

use ego_tree::iter::Edge;
use scraper::node::Element;
use scraper::{Html, Node};
use tracing::debug;

/// One step of a depth-first walk over the document.
#[derive(Debug, Clone, Copy)]
pub enum HtmlEvent<'a> {
    Open(Tag<'a>),
    /// Closing tag, by element name.
    Close(&'a str),
    Text(&'a str),
}

/// Borrowed view of an opening tag.
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    element: &'a Element,
}

impl<'a> Tag<'a> {
    pub fn name(&self) -> &'a str {
        self.element.name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.element.classes().any(|c| c == class)
    }
}

/// A parsed html page.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parse a full page. Parsing is lenient; markup errors are only logged.
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        if !html.errors.is_empty() {
            debug!(errors = html.errors.len(), "html parsed with recoverable errors");
        }
        Self { html }
    }

    /// Events in document order. Comments and doctypes are dropped.
    pub fn events(&self) -> impl Iterator<Item = HtmlEvent<'_>> {
        self.html.tree.root().traverse().filter_map(|edge| match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(element) => Some(HtmlEvent::Open(Tag { element })),
                Node::Text(text) => Some(HtmlEvent::Text(&**text)),
                _ => None,
            },
            Edge::Close(node) => match node.value() {
                Node::Element(element) => Some(HtmlEvent::Close(element.name())),
                _ => None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_follow_document_order() {
        let doc = HtmlDocument::parse(r#"<p class="V8SH_chapter">Syntax:</p><p>A <b>B</b></p>"#);
        let mut trace = Vec::new();
        for event in doc.events() {
            match event {
                HtmlEvent::Open(tag) if tag.name() == "p" || tag.name() == "b" => {
                    trace.push(format!("<{}>", tag.name()));
                }
                HtmlEvent::Close(name) if name == "p" || name == "b" => {
                    trace.push(format!("</{name}>"));
                }
                HtmlEvent::Text(text) => trace.push(text.to_string()),
                _ => {}
            }
        }
        assert_eq!(
            trace,
            ["<p>", "Syntax:", "</p>", "<p>", "A ", "<b>", "B", "</b>", "</p>"]
        );
    }

    #[test]
    fn tags_expose_classes_and_attributes() {
        let doc = HtmlDocument::parse(r#"<a class="x V8SH_rubric" href="v8help://x">t</a>"#);
        let tag = doc
            .events()
            .find_map(|e| match e {
                HtmlEvent::Open(tag) if tag.name() == "a" => Some(tag),
                _ => None,
            })
            .expect("anchor");
        assert!(tag.has_class("V8SH_rubric"));
        assert!(!tag.has_class("V8SH"));
        assert_eq!(tag.attr("href"), Some("v8help://x"));
        assert_eq!(tag.attr("title"), None);
    }
}
