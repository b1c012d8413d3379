//! Table-of-contents decoding for help-book containers.
//!
//! The TOC is a brace-delimited text grammar. [`tokenizer`] splits it,
//! [`parser`] turns tokens into flat chunks, [`page`] links chunks into a
//! bilingual page tree and [`classify`] partitions and walks that tree.

pub mod classify;
pub mod page;
pub mod parser;
pub mod tokenizer;

pub use classify::{
    ENUM_CATALOG_TITLES, GLOBAL_CONTEXT_MARKER, MemberGroup, RootPages, classify, drill_down,
    is_catalog_page,
};
pub use page::{Page, PageTitle, PageTree, ROOT_ID, build_tree, parse_page_tree};
pub use parser::{Chunk, ChunkIter, ChunkProperties, NameObject, parse_chunks};
pub use tokenizer::{Token, TokenKind, Tokenizer};
