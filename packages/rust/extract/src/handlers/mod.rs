//! Block handlers: per-chapter state machines producing [`Fragment`](crate::Fragment)s.

mod markdown;
mod name;
mod parameters;
mod related;
mod typed;
mod usage;

pub use markdown::MarkdownHandler;
pub use name::{NameHandler, PRIMARY_TITLE_CLASS, SECONDARY_TITLE_CLASS, split_name};
pub use parameters::{ParametersHandler, RUBRIC_CLASS};
pub use related::RelatedObjectsHandler;
pub use typed::ValueHandler;
pub use usage::UsageHandler;

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod test_util {
    use helpbook_markdown::HtmlDocument;
    use helpbook_shared::Result;

    use crate::engine::{BlockHandler, Fragment};

    /// Push every event of `html` through a freshly reset handler.
    pub fn run(handler: &mut dyn BlockHandler, html: &str) -> Result<Fragment> {
        handler.reset();
        let doc = HtmlDocument::parse(html);
        for event in doc.events() {
            handler.process_event(&event)?;
        }
        handler.result()
    }
}
