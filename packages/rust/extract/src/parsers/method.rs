//! Method pages.

use helpbook_shared::{DEFAULT_SIGNATURE_NAME, MethodInfo, MethodSignatureInfo, Result};

use super::non_empty;
use crate::chapter::Chapter;
use crate::engine::{Block, Fragment, HandlerKind, PageParser, unexpected_fragment};

/// Builds a [`MethodInfo`]. Each "Syntax variant" chapter opens a signature;
/// a page without variants gets a single [`DEFAULT_SIGNATURE_NAME`] signature.
#[derive(Debug, Default)]
pub struct MethodParser {
    info: MethodInfo,
}

impl MethodParser {
    fn current_signature(&mut self) -> &mut MethodSignatureInfo {
        if self.info.signatures.is_empty() {
            self.info
                .signatures
                .push(MethodSignatureInfo::named(DEFAULT_SIGNATURE_NAME));
        }
        let last = self.info.signatures.len() - 1;
        &mut self.info.signatures[last]
    }
}

impl PageParser for MethodParser {
    type Output = MethodInfo;

    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
        Ok(match chapter {
            Chapter::Syntax
            | Chapter::Description
            | Chapter::MethodVariantDescription
            | Chapter::Note
            | Chapter::Example => Some(HandlerKind::Markdown),
            Chapter::Parameters => Some(HandlerKind::Parameters),
            Chapter::ReturnValue => Some(HandlerKind::Value),
            Chapter::SeeAlso => Some(HandlerKind::RelatedObjects),
            Chapter::SyntaxVariant(_) | Chapter::Availability | Chapter::UseInVersion => None,
            Chapter::Usage | Chapter::Type => {
                return Err(crate::engine::unknown_chapter(chapter));
            }
        })
    }

    fn on_block_started(&mut self, chapter: &Chapter) -> Result<()> {
        if let Chapter::SyntaxVariant(name) = chapter {
            self.info.signatures.push(MethodSignatureInfo::named(name));
        }
        Ok(())
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
        match (&block, fragment) {
            (Block::Header, Fragment::Name(name)) => self.info.name = name,
            (Block::Chapter(Chapter::Syntax), Fragment::Markdown(text)) => {
                self.current_signature().syntax = text;
            }
            (Block::Chapter(Chapter::Parameters), Fragment::Parameters(list)) => {
                self.current_signature().parameters = list;
            }
            (Block::Chapter(Chapter::MethodVariantDescription), Fragment::Markdown(text)) => {
                self.current_signature().description = text;
            }
            (Block::Chapter(Chapter::ReturnValue), Fragment::Value(value)) => {
                self.info.return_value = Some(value);
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

    fn finish(mut self) -> Result<MethodInfo> {
        self.current_signature();
        Ok(self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BlockExtractor;
    use crate::parsers::test_util::fixture;
    use helpbook_shared::{HelpBookError, NamePair};

    #[test]
    fn method_without_variants() {
        let info = fixture("method_message.html", MethodParser::default()).unwrap();
        assert_eq!(info.name, NamePair::new("Сообщить", Some("Message".into())));

        assert_eq!(info.signatures.len(), 1);
        let main = &info.signatures[0];
        assert_eq!(main.name, DEFAULT_SIGNATURE_NAME);
        assert_eq!(main.syntax, "Сообщить(<ТекстСообщения>, <Статус>)");
        assert_eq!(main.parameters.len(), 2);
        assert_eq!(main.parameters[0].name, "ТекстСообщения");
        assert_eq!(main.parameters[0].type_name, "Строка");
        assert!(!main.parameters[0].is_optional);
        assert_eq!(main.parameters[1].name, "Статус");
        assert!(main.parameters[1].is_optional);

        assert!(info.description.starts_with("Выводит сообщение"));
        assert!(info.return_value.is_none());
        assert!(info.example.as_deref().is_some_and(|e| e.contains("Сообщить(")));
        assert_eq!(info.related_objects.len(), 1);
        assert_eq!(info.related_objects[0].name, "СообщениеПользователю");
    }

    #[test]
    fn method_with_return_value() {
        let info = fixture("method_add.html", MethodParser::default()).unwrap();
        assert_eq!(info.name.alias.as_deref(), Some("Add"));
        assert_eq!(info.signatures.len(), 1);
        assert_eq!(info.signatures[0].syntax, "Добавить()");
        assert!(info.signatures[0].parameters.is_empty());

        let value = info.return_value.expect("return value");
        assert_eq!(value.type_name, "СтрокаТаблицыЗначений");
        assert_eq!(value.description, "Добавленная строка.");
        assert!(info.note.is_none());
    }

    #[test]
    fn syntax_variants_become_signatures() {
        let info = fixture("method_variants.html", MethodParser::default()).unwrap();
        let names: Vec<&str> = info.signatures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["По индексу", "По значению"]);
        assert_eq!(info.signatures[0].syntax, "Удалить(<Индекс>)");
        assert_eq!(info.signatures[0].parameters[0].type_name, "Число");
        assert_eq!(info.signatures[0].description, "Удаляет строку по индексу.");
        assert_eq!(info.signatures[1].parameters[0].name, "Строка");
        assert!(info.description.contains("Удаляет"));
    }

    #[test]
    fn single_syntax_block_gets_default_signature() {
        let html = r#"<h1 class="V8SH_pagetitle">Очистить (Clear)</h1>
<p class="V8SH_chapter">Синтаксис:</p><p>Очистить()</p>"#;
        let info = BlockExtractor::new()
            .extract(html, MethodParser::default())
            .unwrap();
        assert_eq!(info.signatures.len(), 1);
        assert_eq!(info.signatures[0].name, "Main");
        assert_eq!(info.signatures[0].syntax, "Очистить()");
    }

    #[test]
    fn page_without_chapters_still_has_a_signature() {
        let info = BlockExtractor::new()
            .extract("<h1 class=\"V8SH_pagetitle\">X</h1>", MethodParser::default())
            .unwrap();
        assert_eq!(info.signatures.len(), 1);
    }

    #[test]
    fn unknown_chapter_fails_the_page() {
        let err = fixture("method_unknown_chapter.html", MethodParser::default()).unwrap_err();
        assert!(matches!(err, HelpBookError::UnknownPageBlock { .. }));
    }

    #[test]
    fn chapter_outside_the_table_fails_the_page() {
        let html = r#"<p class="V8SH_chapter">Использование:</p><p>Только чтение.</p>"#;
        let err = BlockExtractor::new()
            .extract(html, MethodParser::default())
            .unwrap_err();
        assert!(matches!(err, HelpBookError::UnknownPageBlock { .. }));
    }
}
