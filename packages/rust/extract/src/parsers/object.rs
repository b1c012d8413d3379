//! Object (type) pages. Member lists are attached by the caller.

use helpbook_shared::{ObjectInfo, Result};

use super::non_empty;
use crate::chapter::Chapter;
use crate::engine::{
    Block, Fragment, HandlerKind, PageParser, unexpected_fragment, unknown_chapter,
};

#[derive(Debug, Default)]
pub struct ObjectParser {
    info: ObjectInfo,
}

impl PageParser for ObjectParser {
    type Output = ObjectInfo;

    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
        Ok(match chapter {
            Chapter::Description | Chapter::Note | Chapter::Example => Some(HandlerKind::Markdown),
            Chapter::SeeAlso => Some(HandlerKind::RelatedObjects),
            Chapter::Availability | Chapter::UseInVersion => None,
            _ => return Err(unknown_chapter(chapter)),
        })
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
        match (&block, fragment) {
            (Block::Header, Fragment::Name(name)) => self.info.name = name,
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

    fn finish(self) -> Result<ObjectInfo> {
        Ok(self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_util::fixture;

    #[test]
    fn object_page() {
        let info = fixture("object_value_table.html", ObjectParser::default()).unwrap();
        assert_eq!(info.name.name, "ТаблицаЗначений");
        assert_eq!(info.name.alias.as_deref(), Some("ValueTable"));
        assert!(info.description.starts_with("Объект для хранения"));
        assert!(info.description.contains("`Массив`"));
        assert!(info.example.is_some());
        assert_eq!(info.related_objects.len(), 2);
        assert!(info.methods.is_none());
        assert!(info.properties.is_none());
    }
}
