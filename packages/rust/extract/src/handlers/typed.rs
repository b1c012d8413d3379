//! `TYPE -> DESCRIPTION` state machine shared by value and parameter chapters.

use helpbook_markdown::{HtmlEvent, MarkdownWriter};
use helpbook_shared::{Result, ValueInfo};

use super::collapse;
use crate::engine::{BlockHandler, Fragment};

const TYPE_PREFIXES: [&str; 2] = ["Тип:", "Type:"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Part {
    #[default]
    Type,
    Description,
}

/// Splits a chapter body into a type line and a markdown description.
///
/// The type ends at a `.` (alone, leading or trailing a text run) or at a
/// line break once some type text was seen.
#[derive(Debug, Default)]
pub(crate) struct TypedText {
    part: Part,
    type_text: String,
    description: MarkdownWriter,
}

impl TypedText {
    pub(crate) fn process(&mut self, event: &HtmlEvent<'_>) {
        if self.part == Part::Description {
            self.description.process(event);
            return;
        }

        match event {
            HtmlEvent::Text(text) => self.type_run(text),
            HtmlEvent::Open(tag) if tag.name() == "br" && !self.type_text.trim().is_empty() => {
                self.part = Part::Description;
            }
            _ => {}
        }
    }

    fn type_run(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed == "." {
            self.part = Part::Description;
        } else if let Some(rest) = trimmed.strip_prefix('.') {
            self.part = Part::Description;
            self.description.process(&HtmlEvent::Text(rest));
        } else if let Some(head) = trimmed.strip_suffix('.') {
            self.type_text.push_str(head);
            self.part = Part::Description;
        } else {
            self.type_text.push_str(text);
        }
    }

    pub(crate) fn finish(&self) -> ValueInfo {
        let collapsed = collapse(&self.type_text);
        let type_name = TYPE_PREFIXES
            .iter()
            .find_map(|prefix| collapsed.strip_prefix(prefix))
            .unwrap_or(&collapsed)
            .trim()
            .to_string();
        ValueInfo {
            type_name,
            description: self.description.result(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.part = Part::Type;
        self.type_text.clear();
        self.description.reset();
    }
}

/// Return-value and property-type chapters.
#[derive(Debug, Default)]
pub struct ValueHandler {
    body: TypedText,
}

impl BlockHandler for ValueHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()> {
        self.body.process(event);
        Ok(())
    }

    fn result(&mut self) -> Result<Fragment> {
        Ok(Fragment::Value(self.body.finish()))
    }

    fn reset(&mut self) {
        self.body.reset();
    }
}
