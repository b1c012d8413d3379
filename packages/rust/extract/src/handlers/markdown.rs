//! Free-text chapters rendered as markdown.

use helpbook_markdown::{HtmlEvent, MarkdownWriter};
use helpbook_shared::Result;

use crate::engine::{BlockHandler, Fragment};

#[derive(Debug, Default)]
pub struct MarkdownHandler {
    writer: MarkdownWriter,
}

impl BlockHandler for MarkdownHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()> {
        self.writer.process(event);
        Ok(())
    }

    fn result(&mut self) -> Result<Fragment> {
        Ok(Fragment::Markdown(self.writer.result()))
    }

    fn reset(&mut self) {
        self.writer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_util::run;

    #[test]
    fn renders_chapter_body() {
        let mut handler = MarkdownHandler::default();
        let md = run(
            &mut handler,
            r#"<p>Для <a href="v8help://frame/Array">массива</a> см. <strong>пример</strong>.</p>"#,
        )
        .unwrap();
        assert_eq!(
            md,
            Fragment::Markdown("Для `массива` см. **пример**.".into())
        );
    }

    #[test]
    fn reset_forgets_previous_block() {
        let mut handler = MarkdownHandler::default();
        run(&mut handler, "<p>first</p>").unwrap();
        let md = run(&mut handler, "<p>second</p>").unwrap();
        assert_eq!(md, Fragment::Markdown("second".into()));
    }
}
