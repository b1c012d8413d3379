//! Html help page to domain record extraction.
//!
//! This crate provides:
//! - [`BlockExtractor`]: chapter dispatcher over a page's html events
//! - [`handlers`]: per-chapter state machines producing [`Fragment`]s
//! - [`parsers`]: one [`PageParser`] per page kind
//! - [`parse_page`]: page-kind driven entry point returning a [`PageRecord`]

pub mod chapter;
pub mod engine;
pub mod handlers;
pub mod parsers;

use std::fmt;

use serde::Serialize;

use helpbook_shared::{
    ConstructorInfo, EnumInfo, EnumValueInfo, MethodInfo, ObjectInfo, PropertyInfo, Result,
};

pub use chapter::{CHAPTER_CLASS, Chapter};
pub use engine::{Block, BlockExtractor, BlockHandler, Fragment, HandlerKind, PageParser};
pub use parsers::{
    ConstructorParser, EnumParser, EnumValueParser, MethodParser, ObjectParser, PropertyParser,
};

/// What a content page documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Method,
    Property,
    Object,
    Constructor,
    Enum,
    EnumValue,
}

impl PageKind {
    pub const ALL: [PageKind; 6] = [
        Self::Method,
        Self::Property,
        Self::Object,
        Self::Constructor,
        Self::Enum,
        Self::EnumValue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Property => "property",
            Self::Object => "object",
            Self::Constructor => "constructor",
            Self::Enum => "enum",
            Self::EnumValue => "enum-value",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "kebab-case")]
pub enum PageRecord {
    Method(MethodInfo),
    Property(PropertyInfo),
    Object(ObjectInfo),
    Constructor(ConstructorInfo),
    Enum(EnumInfo),
    EnumValue(EnumValueInfo),
}

/// Extract one page with the parser for `kind`.
pub fn parse_page(extractor: &mut BlockExtractor, html: &str, kind: PageKind) -> Result<PageRecord> {
    Ok(match kind {
        PageKind::Method => PageRecord::Method(extractor.extract(html, MethodParser::default())?),
        PageKind::Property => {
            PageRecord::Property(extractor.extract(html, PropertyParser::default())?)
        }
        PageKind::Object => PageRecord::Object(extractor.extract(html, ObjectParser::default())?),
        PageKind::Constructor => {
            PageRecord::Constructor(extractor.extract(html, ConstructorParser::default())?)
        }
        PageKind::Enum => PageRecord::Enum(extractor.extract(html, EnumParser::default())?),
        PageKind::EnumValue => {
            PageRecord::EnumValue(extractor.extract(html, EnumValueParser::default())?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_serialize_with_kind_tag() {
        let mut extractor = BlockExtractor::new();
        let record = parse_page(
            &mut extractor,
            r#"<p class="V8SH_title">Да (Yes)</p><p class="V8SH_chapter">Описание:</p><p>Ответ.</p>"#,
            PageKind::EnumValue,
        )
        .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "enum-value");
        assert_eq!(json["record"]["name"]["name"], "Да");
        assert_eq!(json["record"]["description"], "Ответ.");
    }

    #[test]
    fn one_extractor_serves_every_kind() {
        let mut extractor = BlockExtractor::new();
        let html = r#"<h1 class="V8SH_pagetitle">X (Y)</h1><p class="V8SH_chapter">Описание:</p><p>d</p>"#;
        for kind in PageKind::ALL {
            let record = parse_page(&mut extractor, html, kind).unwrap();
            let json = serde_json::to_value(&record).unwrap();
            assert_eq!(json["kind"], kind.as_str());
        }
    }
}
