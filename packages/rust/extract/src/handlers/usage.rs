//! "Use" chapters of property pages.

use helpbook_markdown::HtmlEvent;
use helpbook_shared::Result;

use crate::engine::{BlockHandler, Fragment};

const READ_ONLY_MARKERS: [&str; 3] = ["только чтение", "read only", "read-only"];

/// Yields a flag telling whether the property is read-only.
#[derive(Debug, Default)]
pub struct UsageHandler {
    text: String,
}

impl BlockHandler for UsageHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()> {
        if let HtmlEvent::Text(text) = event {
            self.text.push_str(text);
        }
        Ok(())
    }

    fn result(&mut self) -> Result<Fragment> {
        let text = self.text.to_lowercase();
        Ok(Fragment::Flag(
            READ_ONLY_MARKERS.iter().any(|marker| text.contains(marker)),
        ))
    }

    fn reset(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_util::run;

    #[test]
    fn read_only_in_either_language() {
        let mut handler = UsageHandler::default();
        assert_eq!(run(&mut handler, "<p>Только чтение.</p>").unwrap(), Fragment::Flag(true));
        assert_eq!(run(&mut handler, "<p>Read only.</p>").unwrap(), Fragment::Flag(true));
        assert_eq!(run(&mut handler, "<p>Чтение и запись.</p>").unwrap(), Fragment::Flag(false));
    }
}
