//! Recursive-descent parser for the TOC grammar.
//!
//! ```text
//! TableOfContent      := '{' int Chunk* '}'
//! Chunk               := '{' int(id) int(parentId) int(childCount) int{childCount} PropertiesContainer '}'
//! PropertiesContainer := '{' int int NameContainer string(htmlPath) '}'
//! NameContainer       := '{' int int NameObject{0,2} '}'
//! NameObject          := '{' string(lang) string(name) '}'
//! ```

use std::iter::Peekable;
use std::str::FromStr;

use helpbook_shared::{HelpBookError, Result};

use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// Maximum number of name objects a name container may hold.
const MAX_NAMES: usize = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One `{lang name}` pair from a name container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameObject {
    pub lang: String,
    pub name: String,
}

/// Properties bag attached to each chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkProperties {
    /// The two leading numeric fields of the properties container.
    pub fields: [i64; 2],
    pub names: Vec<NameObject>,
    pub html_path: String,
}

/// One TOC node before tree assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: u32,
    pub parent_id: u32,
    pub child_ids: Vec<u32>,
    pub properties: ChunkProperties,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Entry point: parse the table header and return a lazy chunk iterator.
///
/// The iterator yields chunks until the table's closing brace; any grammar
/// violation is yielded as an error and ends the iteration.
pub fn parse_chunks(text: &str) -> Result<ChunkIter<'_>> {
    let mut parser = TocParser::new(text);
    parser.expect(TokenKind::Open, "table of contents")?;
    let declared = parser.expect_int::<i64>("chunk count")?;
    Ok(ChunkIter {
        parser,
        declared,
        done: false,
    })
}

/// Lazy stream of chunks from a table of contents.
pub struct ChunkIter<'a> {
    parser: TocParser<'a>,
    declared: i64,
    done: bool,
}

impl ChunkIter<'_> {
    /// Count declared in the table header.
    pub fn declared_count(&self) -> i64 {
        self.declared
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parser.peek_kind() {
            Ok(Some(TokenKind::Close)) => {
                self.done = true;
                match self.parser.next_token("table end") {
                    Ok(_) => self.parser.expect_end().err().map(Err),
                    Err(e) => Some(Err(e)),
                }
            }
            Ok(_) => {
                let chunk = self.parser.parse_chunk();
                if chunk.is_err() {
                    self.done = true;
                }
                Some(chunk)
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

struct TocParser<'a> {
    tokens: Peekable<Tokenizer<'a>>,
    len: usize,
}

impl<'a> TocParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(text).peekable(),
            len: text.len(),
        }
    }

    fn peek_kind(&mut self) -> Result<Option<TokenKind>> {
        match self.tokens.peek() {
            None => Ok(None),
            Some(Ok(tok)) => Ok(Some(tok.kind)),
            Some(Err(_)) => match self.tokens.next() {
                Some(Err(e)) => Err(e),
                _ => Ok(None),
            },
        }
    }

    fn next_token(&mut self, context: &str) -> Result<Token<'a>> {
        match self.tokens.next() {
            Some(tok) => tok,
            None => Err(HelpBookError::toc(
                format!("unexpected end of input in {context}"),
                self.len,
            )),
        }
    }

    /// Nothing may follow the table's closing brace.
    fn expect_end(&mut self) -> Result<()> {
        match self.tokens.next() {
            None => Ok(()),
            Some(Ok(tok)) => Err(HelpBookError::toc(
                format!("unexpected token '{}' after table end", tok.text),
                tok.offset,
            )),
            Some(Err(e)) => Err(e),
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token<'a>> {
        let tok = self.next_token(context)?;
        if tok.kind != kind {
            return Err(HelpBookError::toc(
                format!("expected {kind:?} in {context}, found '{}'", tok.text),
                tok.offset,
            ));
        }
        Ok(tok)
    }

    fn expect_int<T: FromStr>(&mut self, context: &str) -> Result<T> {
        let tok = self.expect(TokenKind::Word, context)?;
        tok.text.parse::<T>().map_err(|_| {
            HelpBookError::toc(
                format!("expected integer in {context}, found '{}'", tok.text),
                tok.offset,
            )
        })
    }

    fn expect_string(&mut self, context: &str) -> Result<String> {
        let tok = self.expect(TokenKind::Quoted, context)?;
        Ok(tok.unquoted())
    }

    fn parse_chunk(&mut self) -> Result<Chunk> {
        self.expect(TokenKind::Open, "chunk")?;
        let id = self.expect_int::<u32>("chunk id")?;
        let parent_id = self.expect_int::<u32>("chunk parent id")?;
        let child_count = self.expect_int::<u32>("chunk child count")?;

        // The declared count is untrusted; ids are only kept once read.
        let mut child_ids = Vec::new();
        for _ in 0..child_count {
            child_ids.push(self.expect_int::<u32>("chunk child id")?);
        }

        let properties = self.parse_properties()?;
        self.expect(TokenKind::Close, "chunk")?;

        Ok(Chunk {
            id,
            parent_id,
            child_ids,
            properties,
        })
    }

    fn parse_properties(&mut self) -> Result<ChunkProperties> {
        self.expect(TokenKind::Open, "properties container")?;
        let fields = [
            self.expect_int::<i64>("properties field")?,
            self.expect_int::<i64>("properties field")?,
        ];
        let names = self.parse_names()?;
        let html_path = self.expect_string("html path")?;
        self.expect(TokenKind::Close, "properties container")?;

        Ok(ChunkProperties {
            fields,
            names,
            html_path,
        })
    }

    fn parse_names(&mut self) -> Result<Vec<NameObject>> {
        self.expect(TokenKind::Open, "name container")?;
        self.expect_int::<i64>("name container field")?;
        self.expect_int::<i64>("name container field")?;

        let mut names = Vec::with_capacity(MAX_NAMES);
        while self.peek_kind()? == Some(TokenKind::Open) {
            let open = self.next_token("name object")?;
            if names.len() == MAX_NAMES {
                return Err(HelpBookError::toc(
                    format!("more than {MAX_NAMES} name objects"),
                    open.offset,
                ));
            }
            let lang = self.expect_string("name language")?;
            let name = self.expect_string("name text")?;
            self.expect(TokenKind::Close, "name object")?;
            names.push(NameObject { lang, name });
        }

        self.expect(TokenKind::Close, "name container")?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{2,
{1,0,1,2,
{0,0,
{0,0,
{"ru","Глобальный контекст"},
{"en","Global context"}
},"objects/Global context.html"}
},
{2,1,0,
{0,0,
{0,0,
{"#","Methods"}
},""}
}
}"##;

    #[test]
    fn parses_chunks_lazily() {
        let mut iter = parse_chunks(SAMPLE).expect("header");
        assert_eq!(iter.declared_count(), 2);

        let first = iter.next().expect("first").expect("ok");
        assert_eq!(first.id, 1);
        assert_eq!(first.parent_id, 0);
        assert_eq!(first.child_ids, vec![2]);
        assert_eq!(first.properties.names.len(), 2);
        assert_eq!(first.properties.names[1].name, "Global context");
        assert_eq!(first.properties.html_path, "objects/Global context.html");

        let second = iter.next().expect("second").expect("ok");
        assert_eq!(second.parent_id, 1);
        assert!(second.child_ids.is_empty());
        assert_eq!(second.properties.html_path, "");

        assert!(iter.next().is_none());
    }

    #[test]
    fn child_ids_match_declared_count() {
        let text = r#"{1,{5,0,3,6,7,8,{0,0,{0,0},""}}}"#;
        let chunk = parse_chunks(text).unwrap().next().unwrap().unwrap();
        assert_eq!(chunk.child_ids, vec![6, 7, 8]);
        assert!(chunk.properties.names.is_empty());
    }

    #[test]
    fn unexpected_token_reports_offset() {
        // Child count says 2 but only one id precedes the properties container.
        let text = r#"{1,{5,0,2,6,{0,0,{0,0},""}}}"#;
        let err = parse_chunks(text).unwrap().next().unwrap().unwrap_err();
        match err {
            HelpBookError::Toc { offset, message } => {
                assert_eq!(offset, 12);
                assert!(message.contains("child id"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn too_many_names_is_an_error() {
        let text = r#"{1,{5,0,0,{0,0,{0,0,{"a","1"},{"b","2"},{"c","3"}},""}}}"#;
        let err = parse_chunks(text).unwrap().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("more than 2"));
    }

    #[test]
    fn missing_table_end_is_an_error() {
        let text = r#"{1,{5,0,0,{0,0,{0,0},""}}"#;
        let results: Vec<_> = parse_chunks(text).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn huge_child_count_fails_on_the_first_missing_id() {
        let text = r#"{1,{5,0,4294967295,6,{0,0,{0,0},""}}}"#;
        let err = parse_chunks(text).unwrap().next().unwrap().unwrap_err();
        match err {
            HelpBookError::Toc { message, .. } => {
                assert!(message.contains("child id"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tokens_after_table_end_are_rejected() {
        let text = r#"{1,{1,0,0,{0,0,{0,0},"x.html"}}} } 42 {"#;
        let results: Vec<_> = parse_chunks(text).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(HelpBookError::Toc { offset, message }) => {
                assert_eq!(*offset, 33);
                assert!(message.contains("after table end"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn trailing_whitespace_after_table_is_fine() {
        let text = "{1,{1,0,0,{0,0,{0,0},\"x.html\"}}}\r\n  \n";
        let results: Vec<_> = parse_chunks(text).unwrap().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn header_must_open_with_brace() {
        assert!(parse_chunks("2 {}").is_err());
    }
}
