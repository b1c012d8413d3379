//! Page heading handler.

use std::sync::LazyLock;

use regex::Regex;

use helpbook_markdown::HtmlEvent;
use helpbook_shared::{NamePair, Result};

use super::collapse;
use crate::engine::{BlockHandler, Fragment};

/// Class of the main page heading.
pub const PRIMARY_TITLE_CLASS: &str = "V8SH_pagetitle";
/// Class of the alternative title line.
pub const SECONDARY_TITLE_CLASS: &str = "V8SH_title";

static NAME_WITH_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\(([^()]+)\)\s*$").expect("valid regex"));

/// Split `Name (Alias)`; anything else is the whole name without alias.
pub fn split_name(heading: &str) -> NamePair {
    let heading = collapse(heading);
    match NAME_WITH_ALIAS.captures(&heading) {
        Some(caps) => NamePair::new(caps[1].trim(), Some(caps[2].trim().to_string())),
        None => NamePair::new(heading, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Primary,
    Secondary,
}

/// Collects the text of the first primary and first secondary title element.
#[derive(Debug, Default)]
pub struct NameHandler {
    primary: String,
    secondary: String,
    /// Style being captured and the nesting depth inside it.
    capturing: Option<(Style, usize)>,
}

impl NameHandler {
    fn buffer(&mut self, style: Style) -> &mut String {
        match style {
            Style::Primary => &mut self.primary,
            Style::Secondary => &mut self.secondary,
        }
    }
}

impl BlockHandler for NameHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()> {
        match (event, self.capturing) {
            (HtmlEvent::Open(_), Some((style, depth))) => self.capturing = Some((style, depth + 1)),
            (HtmlEvent::Close(_), Some((_, 0))) => self.capturing = None,
            (HtmlEvent::Close(_), Some((style, depth))) => self.capturing = Some((style, depth - 1)),
            (HtmlEvent::Text(text), Some((style, _))) => self.buffer(style).push_str(text),
            (HtmlEvent::Open(tag), None) => {
                let style = if tag.has_class(PRIMARY_TITLE_CLASS) {
                    Style::Primary
                } else if tag.has_class(SECONDARY_TITLE_CLASS) {
                    Style::Secondary
                } else {
                    return Ok(());
                };
                // Only the first element of each style counts.
                if self.buffer(style).trim().is_empty() {
                    self.capturing = Some((style, 0));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// The primary heading wins; an empty page yields an empty name.
    fn result(&mut self) -> Result<Fragment> {
        let heading = if self.primary.trim().is_empty() {
            &self.secondary
        } else {
            &self.primary
        };
        Ok(Fragment::Name(split_name(heading)))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_util::run;

    #[test]
    fn splits_alias() {
        assert_eq!(
            split_name("Добавить (Add)"),
            NamePair::new("Добавить", Some("Add".into()))
        );
        assert_eq!(
            split_name(" ТаблицаЗначений.Добавить  (ValueTable.Add) "),
            NamePair::new("ТаблицаЗначений.Добавить", Some("ValueTable.Add".into()))
        );
    }

    #[test]
    fn without_alias_keeps_whole_string() {
        assert_eq!(split_name("Глобальный контекст"), NamePair::new("Глобальный контекст", None));
        assert_eq!(split_name("f (a (b))"), NamePair::new("f (a (b))", None));
    }

    #[test]
    fn primary_heading_wins() {
        let mut handler = NameHandler::default();
        let html = r#"<p class="V8SH_title">Secondary (S)</p><h1 class="V8SH_pagetitle">Массив <i>(Array)</i></h1>"#;
        assert_eq!(
            run(&mut handler, html).unwrap(),
            Fragment::Name(NamePair::new("Массив", Some("Array".into())))
        );
    }

    #[test]
    fn secondary_title_is_the_fallback() {
        let mut handler = NameHandler::default();
        let html = r#"<p>noise</p><p class="V8SH_title">Да (Yes)</p>"#;
        assert_eq!(
            run(&mut handler, html).unwrap(),
            Fragment::Name(NamePair::new("Да", Some("Yes".into())))
        );
    }

    #[test]
    fn empty_page_gives_empty_name() {
        let mut handler = NameHandler::default();
        assert_eq!(
            run(&mut handler, "<p>text</p>").unwrap(),
            Fragment::Name(NamePair::default())
        );
    }
}
