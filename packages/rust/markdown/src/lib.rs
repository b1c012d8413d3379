//! Html event streaming and markdown projection for help pages.
//!
//! [`HtmlDocument`] flattens a parsed page into [`HtmlEvent`]s; a
//! [`MarkdownWriter`] consumes any slice of that stream and renders it as
//! markdown, followed by a small cleanup pipeline.

mod cleanup;
pub mod html;
pub mod writer;

use tracing::instrument;

pub use html::{HtmlDocument, HtmlEvent, Tag};
pub use writer::{INTERNAL_SCHEME, MarkdownWriter, is_internal};

/// Render a whole html page as markdown.
#[instrument(skip_all, fields(len = html.len()))]
pub fn html_to_markdown(html: &str) -> String {
    let doc = HtmlDocument::parse(html);
    let mut writer = MarkdownWriter::new();
    for event in doc.events() {
        writer.process(&event);
    }
    writer.result()
}
