//! Property pages.

use helpbook_shared::{PropertyInfo, Result};

use super::non_empty;
use crate::chapter::Chapter;
use crate::engine::{
    Block, Fragment, HandlerKind, PageParser, unexpected_fragment, unknown_chapter,
};

#[derive(Debug, Default)]
pub struct PropertyParser {
    info: PropertyInfo,
}

impl PageParser for PropertyParser {
    type Output = PropertyInfo;

    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
        Ok(match chapter {
            Chapter::Description | Chapter::Note => Some(HandlerKind::Markdown),
            Chapter::Usage => Some(HandlerKind::Usage),
            Chapter::Type => Some(HandlerKind::Value),
            Chapter::SeeAlso => Some(HandlerKind::RelatedObjects),
            Chapter::Availability | Chapter::UseInVersion | Chapter::Example => None,
            _ => return Err(unknown_chapter(chapter)),
        })
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
        match (&block, fragment) {
            (Block::Header, Fragment::Name(name)) => self.info.name = name,
            (Block::Chapter(Chapter::Usage), Fragment::Flag(read_only)) => {
                self.info.read_only = read_only;
            }
            (Block::Chapter(Chapter::Type), Fragment::Value(value)) => {
                self.info.type_name = value.type_name;
                // Some pages describe the value inside the type chapter.
                if self.info.description.is_empty() {
                    self.info.description = value.description;
                }
            }
            (Block::Chapter(Chapter::Description), Fragment::Markdown(text)) => {
                self.info.description = text;
            }
            (Block::Chapter(Chapter::Note), Fragment::Markdown(text)) => {
                self.info.note = non_empty(text);
            }
            (Block::Chapter(Chapter::SeeAlso), Fragment::RelatedObjects(list)) => {
                self.info.related_objects = list;
            }
            (_, fragment) => return Err(unexpected_fragment(&block, &fragment)),
        }
        Ok(())
    }

    fn finish(self) -> Result<PropertyInfo> {
        Ok(self.info)
    }
}
