//! "See also" chapters: anchors become related objects.

use helpbook_markdown::HtmlEvent;
use helpbook_shared::{HelpBookError, RelatedObject, Result};

use super::collapse;
use crate::engine::{BlockHandler, Fragment};

#[derive(Debug, Default)]
struct OpenAnchor {
    href: Option<String>,
    text: String,
}

#[derive(Debug, Default)]
pub struct RelatedObjectsHandler {
    anchor: Option<OpenAnchor>,
    objects: Vec<RelatedObject>,
}

impl RelatedObjectsHandler {
    fn close_anchor(&mut self) -> Result<()> {
        let Some(anchor) = self.anchor.take() else {
            return Ok(());
        };
        let name = collapse(&anchor.text);
        if name.is_empty() {
            return Ok(());
        }
        match anchor.href.filter(|href| !href.trim().is_empty()) {
            Some(href) => {
                self.objects.push(RelatedObject { name, href });
                Ok(())
            }
            None => Err(HelpBookError::MalformedLink { text: name }),
        }
    }
}

impl BlockHandler for RelatedObjectsHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()> {
        match event {
            HtmlEvent::Open(tag) if tag.name() == "a" => {
                self.anchor = Some(OpenAnchor {
                    href: tag.attr("href").map(str::to_string),
                    text: String::new(),
                });
            }
            HtmlEvent::Text(text) => {
                if let Some(anchor) = &mut self.anchor {
                    anchor.text.push_str(text);
                }
            }
            HtmlEvent::Close("a") => self.close_anchor()?,
            _ => {}
        }
        Ok(())
    }

    fn result(&mut self) -> Result<Fragment> {
        self.close_anchor()?;
        Ok(Fragment::RelatedObjects(std::mem::take(&mut self.objects)))
    }

    fn reset(&mut self) {
        self.anchor = None;
        self.objects.clear();
    }
}
