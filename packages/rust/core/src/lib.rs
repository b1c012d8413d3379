//! Help book read sessions for helpbook.
//!
//! This crate ties together the container reader, the page tree and page
//! extraction into end-to-end workflows (e.g., [`HelpBook::extract`]).

pub mod locate;
pub mod pipeline;

pub use helpbook_extract::{PageKind, PageRecord};
pub use locate::find_container;
pub use pipeline::{
    Extraction, ExtractionSummary, GlobalContextInfo, HelpBook, PageFailure, ProgressReporter,
    SilentProgress,
};
