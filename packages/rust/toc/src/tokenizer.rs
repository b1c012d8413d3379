//! Single-pass tokenizer for the brace/quote TOC grammar.
//!
//! Rules:
//! - `{` and `}` are tokens on their own and always end the current word
//! - `,` ends the current word and is discarded
//! - unquoted whitespace separates words
//! - `"` opens a quoted string; inside it `""` is an escaped quote and every
//!   other delimiter rule is suspended until the closing `"`

use helpbook_shared::{HelpBookError, Result};

/// Token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    /// Bare word (numbers in practice).
    Word,
    /// Quoted string, raw text including the surrounding quotes.
    Quoted,
}

/// A token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token start in the tokenized text.
    pub offset: usize,
}

impl Token<'_> {
    /// Content of a quoted token with the outer quotes removed and `""` unescaped.
    pub fn unquoted(&self) -> String {
        let inner = self
            .text
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(self.text);
        inner.replace("\"\"", "\"")
    }
}

/// Iterator over the tokens of a TOC text.
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer, skipping a leading byte-order mark if present.
    pub fn new(text: &'a str) -> Self {
        let pos = if text.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        Self { text, pos }
    }

    fn scan_quoted(&mut self, start: usize) -> Result<Token<'a>> {
        let bytes = self.text.as_bytes();
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                self.pos = i + 1;
                return Ok(Token {
                    kind: TokenKind::Quoted,
                    text: &self.text[start..=i],
                    offset: start,
                });
            }
            i += 1;
        }
        self.pos = bytes.len();
        Err(HelpBookError::toc("unterminated quoted string", start))
    }
}

fn is_boundary(b: u8) -> bool {
    matches!(b, b'{' | b'}' | b',' | b'"') || b.is_ascii_whitespace()
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;
            match bytes[start] {
                b',' => self.pos += 1,
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'{' | b'}' => {
                    self.pos += 1;
                    let kind = if bytes[start] == b'{' {
                        TokenKind::Open
                    } else {
                        TokenKind::Close
                    };
                    return Some(Ok(Token {
                        kind,
                        text: &self.text[start..start + 1],
                        offset: start,
                    }));
                }
                b'"' => return Some(self.scan_quoted(start)),
                _ => {
                    // Boundary bytes are all ASCII, so the slice stays on char boundaries.
                    let mut end = start;
                    while end < bytes.len() && !is_boundary(bytes[end]) {
                        end += 1;
                    }
                    self.pos = end;
                    return Some(Ok(Token {
                        kind: TokenKind::Word,
                        text: &self.text[start..end],
                        offset: start,
                    }));
                }
            }
        }

        None
    }
}
