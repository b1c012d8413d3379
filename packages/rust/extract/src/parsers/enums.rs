//! Enumeration and enumeration-value pages.

use helpbook_shared::{EnumInfo, EnumValueInfo, Result};

use crate::chapter::Chapter;
use crate::engine::{
    Block, Fragment, HandlerKind, PageParser, unexpected_fragment, unknown_chapter,
};

/// Builds an [`EnumInfo`] without values; the caller appends them.
#[derive(Debug, Default)]
pub struct EnumParser {
    info: EnumInfo,
}

impl PageParser for EnumParser {
    type Output = EnumInfo;

    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
        Ok(match chapter {
            Chapter::Description => Some(HandlerKind::Markdown),
            Chapter::SeeAlso => Some(HandlerKind::RelatedObjects),
            Chapter::Availability | Chapter::UseInVersion | Chapter::Note | Chapter::Example => {
                None
            }
            _ => return Err(unknown_chapter(chapter)),
        })
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
        match (&block, fragment) {
            (Block::Header, Fragment::Name(name)) => self.info.name = name,
            (Block::Chapter(Chapter::Description), Fragment::Markdown(text)) => {
                self.info.description = text;
            }
            (Block::Chapter(Chapter::SeeAlso), Fragment::RelatedObjects(list)) => {
                self.info.related_objects = list;
            }
            (_, fragment) => return Err(unexpected_fragment(&block, &fragment)),
        }
        Ok(())
    }

    fn finish(self) -> Result<EnumInfo> {
        Ok(self.info)
    }
}

#[derive(Debug, Default)]
pub struct EnumValueParser {
    info: EnumValueInfo,
}

impl PageParser for EnumValueParser {
    type Output = EnumValueInfo;

    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
        Ok(match chapter {
            Chapter::Description => Some(HandlerKind::Markdown),
            Chapter::SeeAlso => Some(HandlerKind::RelatedObjects),
            Chapter::Availability | Chapter::UseInVersion | Chapter::Note => None,
            _ => return Err(unknown_chapter(chapter)),
        })
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
        match (&block, fragment) {
            (Block::Header, Fragment::Name(name)) => self.info.name = name,
            (Block::Chapter(Chapter::Description), Fragment::Markdown(text)) => {
                self.info.description = text;
            }
            (Block::Chapter(Chapter::SeeAlso), Fragment::RelatedObjects(list)) => {
                self.info.related_objects = list;
            }
            (_, fragment) => return Err(unexpected_fragment(&block, &fragment)),
        }
        Ok(())
    }

    fn finish(self) -> Result<EnumValueInfo> {
        Ok(self.info)
    }
}
