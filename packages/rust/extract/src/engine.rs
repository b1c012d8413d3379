//! Chapter dispatch over a page's html event stream.
//!
//! A [`BlockExtractor`] watches for chapter markers. Each marker finalizes the
//! running [`BlockHandler`], hands its [`Fragment`] to the [`PageParser`], and
//! activates the handler the parser picks for the next chapter. Content before
//! the first marker goes to the page-heading handler.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use helpbook_markdown::{HtmlDocument, HtmlEvent};
use helpbook_shared::{
    HelpBookError, MethodParameterInfo, NamePair, RelatedObject, Result, ValueInfo,
};

use crate::chapter::{CHAPTER_CLASS, Chapter};
use crate::handlers::{
    MarkdownHandler, NameHandler, ParametersHandler, RelatedObjectsHandler, UsageHandler,
    ValueHandler,
};

// ---------------------------------------------------------------------------
// Handler contract
// ---------------------------------------------------------------------------

/// Output of one handler for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Name(NamePair),
    Markdown(String),
    Parameters(Vec<MethodParameterInfo>),
    Value(ValueInfo),
    RelatedObjects(Vec<RelatedObject>),
    Flag(bool),
}

impl Fragment {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Markdown(_) => "markdown",
            Self::Parameters(_) => "parameters",
            Self::Value(_) => "value",
            Self::RelatedObjects(_) => "related objects",
            Self::Flag(_) => "flag",
        }
    }
}

/// Stateful consumer of the events inside one block.
pub trait BlockHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()>;

    /// Finalize the block. The handler must be [`reset`](Self::reset) before reuse.
    fn result(&mut self) -> Result<Fragment>;

    fn reset(&mut self);
}

/// Handler implementations, one instance of each per extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Name,
    Markdown,
    Parameters,
    Value,
    RelatedObjects,
    Usage,
}

impl HandlerKind {
    fn create(self) -> Box<dyn BlockHandler> {
        match self {
            Self::Name => Box::new(NameHandler::default()),
            Self::Markdown => Box::new(MarkdownHandler::default()),
            Self::Parameters => Box::new(ParametersHandler::default()),
            Self::Value => Box::new(ValueHandler::default()),
            Self::RelatedObjects => Box::new(RelatedObjectsHandler::default()),
            Self::Usage => Box::new(UsageHandler::default()),
        }
    }
}

/// Where a finished fragment came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Content before the first chapter marker.
    Header,
    Chapter(Chapter),
}

/// Per-page-kind routing and reduction.
pub trait PageParser {
    type Output;

    /// Handler for a chapter. `Ok(None)` ignores the chapter; chapters the
    /// page kind does not know are [`HelpBookError::UnknownPageBlock`].
    fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>>;

    fn on_block_started(&mut self, _chapter: &Chapter) -> Result<()> {
        Ok(())
    }

    fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()>;

    fn finish(self) -> Result<Self::Output>;
}

/// Error for a chapter outside a page kind's table.
pub fn unknown_chapter(chapter: &Chapter) -> HelpBookError {
    HelpBookError::UnknownPageBlock {
        title: chapter.to_string(),
    }
}

/// Error for a fragment a parser cannot place.
pub fn unexpected_fragment(block: &Block, fragment: &Fragment) -> HelpBookError {
    HelpBookError::extraction(format!(
        "unexpected {} fragment for {block:?}",
        fragment.kind_name()
    ))
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

enum State {
    /// Inside an ignored chapter.
    Idle,
    Active { block: Block, kind: HandlerKind },
    /// Reading a chapter marker's text; `depth` counts nested elements.
    AwaitingTitle { depth: usize, title: String },
}

/// Reusable chapter dispatcher. Handlers are created lazily and reset between blocks.
pub struct BlockExtractor {
    handlers: HashMap<HandlerKind, Box<dyn BlockHandler>>,
    state: State,
}

impl Default for BlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockExtractor {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            state: State::Idle,
        }
    }

    /// Run one page through `parser`.
    #[instrument(skip_all, fields(len = html.len()))]
    pub fn extract<P: PageParser>(&mut self, html: &str, mut parser: P) -> Result<P::Output> {
        let doc = HtmlDocument::parse(html);
        self.activate(Block::Header, HandlerKind::Name);

        let outcome = self.run(&doc, &mut parser);
        if outcome.is_err() {
            self.state = State::Idle;
        }
        outcome?;
        parser.finish()
    }

    fn run<P: PageParser>(&mut self, doc: &HtmlDocument, parser: &mut P) -> Result<()> {
        for event in doc.events() {
            if let State::AwaitingTitle { depth, title } = &mut self.state {
                match event {
                    HtmlEvent::Open(_) => *depth += 1,
                    HtmlEvent::Text(text) => title.push_str(text),
                    HtmlEvent::Close(_) if *depth == 0 => {
                        let title = std::mem::take(title);
                        self.start_chapter(&title, parser)?;
                    }
                    HtmlEvent::Close(_) => *depth -= 1,
                }
                continue;
            }

            if matches!(&event, HtmlEvent::Open(tag) if tag.has_class(CHAPTER_CLASS)) {
                self.finish_block(parser)?;
                self.state = State::AwaitingTitle {
                    depth: 0,
                    title: String::new(),
                };
                continue;
            }

            if let State::Active { kind, .. } = &self.state {
                if let Some(handler) = self.handlers.get_mut(kind) {
                    handler.process_event(&event)?;
                }
            }
        }

        if let State::AwaitingTitle { title, .. } = &mut self.state {
            let title = std::mem::take(title);
            self.start_chapter(&title, parser)?;
        }
        self.finish_block(parser)
    }

    fn activate(&mut self, block: Block, kind: HandlerKind) {
        self.handlers
            .entry(kind)
            .or_insert_with(|| kind.create())
            .reset();
        self.state = State::Active { block, kind };
    }

    fn start_chapter<P: PageParser>(&mut self, title: &str, parser: &mut P) -> Result<()> {
        let chapter = Chapter::parse(title)?;
        parser.on_block_started(&chapter)?;
        match parser.handler_for(&chapter)? {
            Some(kind) => {
                trace!(%chapter, ?kind, "chapter started");
                self.activate(Block::Chapter(chapter), kind);
            }
            None => {
                debug!(%chapter, "chapter ignored");
                self.state = State::Idle;
            }
        }
        Ok(())
    }

    fn finish_block<P: PageParser>(&mut self, parser: &mut P) -> Result<()> {
        let State::Active { block, kind } = std::mem::replace(&mut self.state, State::Idle) else {
            return Ok(());
        };
        let handler = self
            .handlers
            .get_mut(&kind)
            .ok_or_else(|| HelpBookError::extraction(format!("no {kind:?} handler")))?;
        let fragment = handler.result()?;
        parser.on_block_finished(block, fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every block it sees; markdown for every chapter.
    #[derive(Debug, Default)]
    struct Recorder {
        started: Vec<Chapter>,
        blocks: Vec<(Block, Fragment)>,
        ignore: Option<Chapter>,
    }

    impl PageParser for Recorder {
        type Output = Self;

        fn handler_for(&self, chapter: &Chapter) -> Result<Option<HandlerKind>> {
            if self.ignore.as_ref() == Some(chapter) {
                return Ok(None);
            }
            Ok(Some(HandlerKind::Markdown))
        }

        fn on_block_started(&mut self, chapter: &Chapter) -> Result<()> {
            self.started.push(chapter.clone());
            Ok(())
        }

        fn on_block_finished(&mut self, block: Block, fragment: Fragment) -> Result<()> {
            self.blocks.push((block, fragment));
            Ok(())
        }

        fn finish(self) -> Result<Self> {
            Ok(self)
        }
    }

    const PAGE: &str = r#"<html><body>
<h1 class="V8SH_pagetitle">Сообщить (Message)</h1>
<p class="V8SH_chapter">Описание:</p>
<p>Выводит <b>сообщение</b>.</p>
<p class="V8SH_chapter"><span>Доступность:</span></p>
<p>Везде.</p>
<p class="V8SH_chapter">Примечание:</p>
Текст.
</body></html>"#;

    #[test]
    fn dispatches_blocks_in_order() {
        let mut extractor = BlockExtractor::new();
        let out = extractor.extract(PAGE, Recorder::default()).unwrap();

        assert_eq!(
            out.started,
            [Chapter::Description, Chapter::Availability, Chapter::Note]
        );
        assert_eq!(out.blocks.len(), 4);
        assert_eq!(
            out.blocks[0],
            (
                Block::Header,
                Fragment::Name(NamePair::new("Сообщить", Some("Message".into())))
            )
        );
        assert_eq!(
            out.blocks[1],
            (
                Block::Chapter(Chapter::Description),
                Fragment::Markdown("Выводит **сообщение**.".into())
            )
        );
        assert_eq!(
            out.blocks[3],
            (
                Block::Chapter(Chapter::Note),
                Fragment::Markdown("Текст.".into())
            )
        );
    }

    #[test]
    fn ignored_chapters_produce_nothing() {
        let mut extractor = BlockExtractor::new();
        let out = extractor
            .extract(
                PAGE,
                Recorder {
                    ignore: Some(Chapter::Availability),
                    ..Recorder::default()
                },
            )
            .unwrap();
        assert_eq!(out.blocks.len(), 3);
        assert!(
            out.blocks
                .iter()
                .all(|(block, _)| *block != Block::Chapter(Chapter::Availability))
        );
    }

    #[test]
    fn handlers_are_clean_between_pages() {
        let mut extractor = BlockExtractor::new();
        extractor.extract(PAGE, Recorder::default()).unwrap();
        let second = extractor
            .extract(
                r#"<p class="V8SH_chapter">Описание:</p><p>Второй.</p>"#,
                Recorder::default(),
            )
            .unwrap();
        assert_eq!(
            second.blocks.last().map(|(_, f)| f.clone()),
            Some(Fragment::Markdown("Второй.".into()))
        );
    }

    #[test]
    fn unknown_chapter_aborts_the_page() {
        let mut extractor = BlockExtractor::new();
        let err = extractor
            .extract(
                r#"<h1 class="V8SH_pagetitle">X</h1><p class="V8SH_chapter">Прочее:</p>"#,
                Recorder::default(),
            )
            .unwrap_err();
        assert!(matches!(err, HelpBookError::UnknownPageBlock { .. }));
    }
}
