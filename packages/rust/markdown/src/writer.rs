//! Incremental html-event to markdown writer.

use url::Url;

use crate::cleanup;
use crate::html::{HtmlEvent, Tag};

/// Href scheme of cross references inside the help book.
pub const INTERNAL_SCHEME: &str = "v8help";

#[derive(Debug, Default)]
struct PendingLink {
    href: Option<String>,
    text: String,
}

/// Streams html events into markdown text.
///
/// Headings, emphasis, lists, links and preformatted blocks are rendered;
/// table cells flow as plain text. The writer is reusable through [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct MarkdownWriter {
    out: String,
    stack: Vec<String>,
    list_depth: usize,
    pre: usize,
    code: usize,
    blockquote: usize,
    /// Depth inside `script`/`style`, whose text is dropped.
    hidden: usize,
    link: Option<PendingLink>,
    pending_space: bool,
    /// Opening emphasis markers not yet followed by any text.
    pending_markers: String,
}

impl MarkdownWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, event: &HtmlEvent<'_>) {
        match event {
            HtmlEvent::Open(tag) => self.open(tag),
            HtmlEvent::Close(name) => self.close(name),
            HtmlEvent::Text(text) => self.text(text),
        }
    }

    /// Markdown produced so far, after cleanup.
    pub fn result(&self) -> String {
        cleanup::run_pipeline(&self.out)
    }

    pub fn is_empty(&self) -> bool {
        self.out.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn verbatim(&self) -> bool {
        self.pre > 0 || self.blockquote > 0
    }

    fn open(&mut self, tag: &Tag<'_>) {
        let name = tag.name();
        self.stack.push(name.to_string());
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_break();
                let level = usize::from(name.as_bytes()[1] - b'0');
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
            }
            "p" | "div" | "table" => self.block_break(),
            "tr" => self.line_break(),
            "td" | "th" => self.pending_space = true,
            "br" => {
                if let Some(link) = &mut self.link {
                    link.text.push(' ');
                } else {
                    self.out.push('\n');
                    self.pending_space = false;
                }
            }
            "strong" | "b" => self.inline_marker("**"),
            "em" | "i" => self.inline_marker("*"),
            "code" if self.pre == 0 => {
                self.inline_marker("`");
                self.code += 1;
            }
            "pre" => {
                self.block_break();
                self.out.push_str("```\n");
                self.pre += 1;
            }
            "blockquote" => {
                self.block_break();
                self.blockquote += 1;
            }
            "ul" | "ol" => {
                self.line_break();
                self.list_depth += 1;
            }
            "li" => {
                self.line_break();
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                self.out.push_str(&indent);
                self.out.push_str("- ");
                self.pending_space = false;
            }
            "a" => {
                self.link = Some(PendingLink {
                    href: tag.attr("href").map(str::to_string),
                    text: String::new(),
                });
            }
            "script" | "style" => self.hidden += 1,
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        if let Some(pos) = self.stack.iter().rposition(|open| open == name) {
            self.stack.truncate(pos);
        }
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p" | "table" => self.block_break(),
            "div" => self.line_break(),
            "strong" | "b" => self.close_marker("**"),
            "em" | "i" => self.close_marker("*"),
            "code" if self.code > 0 => {
                self.code -= 1;
                self.close_marker("`");
            }
            "pre" if self.pre > 0 => {
                self.pre -= 1;
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("```");
                self.block_break();
            }
            "blockquote" if self.blockquote > 0 => {
                self.blockquote -= 1;
                self.block_break();
            }
            "ul" | "ol" => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.block_break();
                }
            }
            "a" => self.finish_link(),
            "script" | "style" => self.hidden = self.hidden.saturating_sub(1),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.hidden > 0 {
            return;
        }

        if self.verbatim() {
            match &mut self.link {
                Some(link) => link.text.push_str(text),
                None => {
                    self.flush_markers();
                    self.out.push_str(text);
                }
            }
            return;
        }

        if let Some(link) = &mut self.link {
            link.text.push_str(text);
            return;
        }

        let leading = text.starts_with(char::is_whitespace);
        let trailing = text.ends_with(char::is_whitespace);
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        if leading {
            self.pending_space = true;
        }
        self.write_inline(&collapsed);
        self.pending_space = trailing;
    }

    fn finish_link(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        let text = if self.verbatim() {
            link.text
        } else {
            link.text.split_whitespace().collect::<Vec<_>>().join(" ")
        };
        if text.is_empty() {
            return;
        }

        let rendered = match link.href.as_deref().map(str::trim) {
            Some(href) if is_internal(href) => format!("`{text}`"),
            Some(href) if !href.is_empty() => format!("[{text}]({href})"),
            _ => text,
        };
        self.write_inline(&rendered);
    }

    /// Emit inline content, flushing a pending separator first.
    fn write_inline(&mut self, s: &str) {
        if self.pending_space && !self.at_line_start() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.flush_markers();
        self.out.push_str(s);
    }

    /// Opening markers wait for content so a leading space lands before them.
    fn inline_marker(&mut self, marker: &str) {
        self.pending_markers.push_str(marker);
    }

    fn close_marker(&mut self, marker: &str) {
        if self.pending_markers.ends_with(marker) {
            let kept = self.pending_markers.len() - marker.len();
            self.pending_markers.truncate(kept);
        } else {
            self.out.push_str(marker);
        }
    }

    fn flush_markers(&mut self) {
        let markers = std::mem::take(&mut self.pending_markers);
        self.out.push_str(&markers);
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn line_break(&mut self) {
        self.pending_space = false;
        trim_trailing_spaces(&mut self.out);
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    fn block_break(&mut self) {
        self.pending_space = false;
        trim_trailing_spaces(&mut self.out);
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }
}

/// Whether an href points inside the help book.
pub fn is_internal(href: &str) -> bool {
    Url::parse(href).is_ok_and(|url| url.scheme() == INTERNAL_SCHEME)
}

fn trim_trailing_spaces(out: &mut String) {
    let kept = out.trim_end_matches([' ', '\t']).len();
    out.truncate(kept);
}
