//! Constructor pages.

use helpbook_shared::{ConstructorInfo, Result};

use super::non_empty;
use crate::chapter::Chapter;
use crate::engine::{
    Block, Fragment, HandlerKind, PageParser, unexpected_fragment, unknown_chapter,
};

#[derive(Debug, Default)]
pub struct ConstructorParser {
    info: ConstructorInfo,
}

impl PageParser for ConstructorParser {
    type Output = ConstructorInfo;

    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
        Ok(match chapter {
            Chapter::Syntax | Chapter::Description | Chapter::Note | Chapter::Example => {
                Some(HandlerKind::Markdown)
            }
            Chapter::Parameters => Some(HandlerKind::Parameters),
            Chapter::SeeAlso => Some(HandlerKind::RelatedObjects),
            Chapter::Availability | Chapter::UseInVersion => None,
            _ => return Err(unknown_chapter(chapter)),
        })
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
        match (&block, fragment) {
            // Constructors are named by their primary heading only.
            (Block::Header, Fragment::Name(name)) => self.info.name = name.name,
            (Block::Chapter(Chapter::Syntax), Fragment::Markdown(text)) => self.info.syntax = text,
            (Block::Chapter(Chapter::Parameters), Fragment::Parameters(list)) => {
                self.info.parameters = list;
            }
            (Block::Chapter(Chapter::Description), Fragment::Markdown(text)) => {
                self.info.description = text;
            }
            (Block::Chapter(Chapter::Note), Fragment::Markdown(text)) => {
                self.info.note = non_empty(text);
            }
            (Block::Chapter(Chapter::Example), Fragment::Markdown(text)) => {
                self.info.example = non_empty(text);
            }
            (Block::Chapter(Chapter::SeeAlso), Fragment::RelatedObjects(list)) => {
                self.info.related_objects = list;
            }
            (_, fragment) => return Err(unexpected_fragment(&block, &fragment)),
        }
        Ok(())
    }

    fn finish(self) -> Result<ConstructorInfo> {
        Ok(self.info)
    }
}
